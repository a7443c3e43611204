use serde::{Deserialize, Serialize};

use crate::{Piece, Position, Side, BOARD_SIZE};

const N: usize = BOARD_SIZE as usize;

/// The 8x8 grid of pieces.
///
/// On the wire this is an array of 8 rows, each an array of 8 cells that are
/// either `null` or a piece.
///
/// The board is [`Copy`]. The rules never change a board in place when they
/// are asked what a move would do; they hand back a new one. The only
/// mutations (placing, clearing and removing a piece) are crate-private and
/// are applied by the rules module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Option<Piece>; N]; N],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [[None; N]; N],
        }
    }

    /// The starting position: jackals on rows 0 and 1, wombats on rows 6 and 7,
    /// each on the cells where `(row + col)` is even.
    pub fn initial() -> Self {
        let rows = [
            (0, Side::Jackal),
            (1, Side::Jackal),
            (6, Side::Wombat),
            (7, Side::Wombat),
        ];
        Self::from_pieces(rows.into_iter().flat_map(|(row, side)| {
            (0..BOARD_SIZE)
                .filter(move |col| (row + col) % 2 == 0)
                .map(move |col| (Position::new(row, col), Piece::new(side)))
        }))
    }

    /// Creates a board from a list of pieces.
    ///
    /// Panics if a position is off the board or occupied twice.
    pub fn from_pieces(pieces: impl IntoIterator<Item = (Position, Piece)>) -> Self {
        let mut board = Self::empty();
        for (pos, piece) in pieces {
            assert!(pos.is_on_board(), "piece placed off the board at {}", pos);
            assert!(board.get(pos).is_none(), "two pieces placed at {}", pos);
            board.place(pos, piece);
        }
        board
    }

    /// The piece at the given position. Off-board positions are always empty.
    pub fn get(&self, pos: Position) -> Option<Piece> {
        if pos.is_on_board() {
            self.cells[pos.row as usize][pos.col as usize]
        } else {
            None
        }
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    /// All pieces with their positions, in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(|pos| self.get(pos).map(|piece| (pos, piece)))
    }

    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = Position> + '_ {
        self.pieces()
            .filter(move |(_, piece)| piece.side() == side)
            .map(|(pos, _)| pos)
    }

    pub fn count(&self, side: Side) -> usize {
        self.pieces_of(side).count()
    }

    pub fn total(&self) -> usize {
        self.pieces().count()
    }

    /// Puts a piece on a cell, replacing whatever was there.
    pub(crate) fn place(&mut self, pos: Position, piece: Piece) {
        self.cells[pos.row as usize][pos.col as usize] = Some(piece);
    }

    /// Takes the piece off a cell and returns it.
    pub(crate) fn remove(&mut self, pos: Position) -> Option<Piece> {
        self.cells[pos.row as usize][pos.col as usize].take()
    }

    pub fn rows(&self) -> &[[Option<Piece>; N]; N] {
        &self.cells
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}
