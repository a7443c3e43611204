use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const BOARD_SIZE: i8 = 8;

/// The four orthogonal steps, in the order in which moves are enumerated.
pub const DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A cell coordinate.
///
/// The coordinates are signed so that anything a client sends can be
/// represented; use [`Position::is_on_board()`] before indexing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i8,
    pub col: i8,
}

impl Position {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    pub fn is_on_board(self) -> bool {
        (0..BOARD_SIZE).contains(&self.row) && (0..BOARD_SIZE).contains(&self.col)
    }

    pub fn manhattan_distance(self, other: Position) -> u32 {
        u32::from(self.row.abs_diff(other.row)) + u32::from(self.col.abs_diff(other.col))
    }

    /// Distance to the center of the board, doubled so that it stays integral.
    pub fn doubled_center_distance(self) -> i32 {
        let doubled = |x: i8| (2 * i32::from(x) - i32::from(BOARD_SIZE - 1)).abs();
        doubled(self.row) + doubled(self.col)
    }

    pub fn offset(self, (d_row, d_col): (i8, i8)) -> Position {
        Position::new(self.row.saturating_add(d_row), self.col.saturating_add(d_col))
    }

    /// The on-board orthogonal neighbors, in [`DIRECTIONS`] order.
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        DIRECTIONS
            .into_iter()
            .map(move |dir| self.offset(dir))
            .filter(|pos| pos.is_on_board())
    }

    /// Row-major index into a 64-cell board. Only valid for on-board positions.
    pub(crate) fn index(self) -> usize {
        debug_assert!(self.is_on_board());
        (self.row as usize) * (BOARD_SIZE as usize) + self.col as usize
    }

    pub(crate) fn from_index(idx: usize) -> Position {
        debug_assert!(idx < 64);
        Position::new((idx / 8) as i8, (idx % 8) as i8)
    }

    /// All 64 cells in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..64).map(Position::from_index)
    }
}

/// Positions render as the `"row,col"` keys that are used for holes on the wire.
impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParsePositionError {
    input: String,
}

impl std::error::Error for ParsePositionError {}

impl std::fmt::Display for ParsePositionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not a \"row,col\" position", self.input)
    }
}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePositionError {
            input: String::from(s),
        };
        let (row, col) = s.split_once(',').ok_or_else(err)?;
        let row = row.trim().parse::<i8>().map_err(|_| err())?;
        let col = col.trim().parse::<i8>().map_err(|_| err())?;
        Ok(Position::new(row, col))
    }
}
