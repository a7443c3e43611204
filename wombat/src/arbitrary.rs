use quickcheck::{Arbitrary, Gen};

use crate::{Board, GameState, Holes, Piece, Position, Side};

/// A random, but reachable-looking, game state.
///
/// Jackals never stand on holes, because they die when entering one and a hole
/// can only be dug on an empty cell. Wombats may stand on holes.
#[derive(Clone, Debug)]
pub struct ArbitraryState(pub GameState);

impl Arbitrary for Side {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&[Side::Wombat, Side::Jackal]).unwrap()
    }
}

impl Arbitrary for ArbitraryState {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut pieces = Vec::new();
        let mut holes = Holes::new();
        for pos in Position::all() {
            // Roughly a quarter of the cells each for wombats, jackals and holes
            match u8::arbitrary(g) % 8 {
                0 | 1 => pieces.push((pos, Piece::WOMBAT)),
                2 | 3 => pieces.push((pos, Piece::JACKAL)),
                4 => {
                    pieces.push((pos, Piece::WOMBAT));
                    holes = holes.insert(pos);
                }
                5 | 6 => holes = holes.insert(pos),
                _ => {}
            }
        }
        ArbitraryState(GameState {
            board: Board::from_pieces(pieces),
            holes,
            current_turn: Side::arbitrary(g),
        })
    }
}
