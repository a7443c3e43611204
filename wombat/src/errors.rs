use crate::{Position, Side};

/// The error type for a rejected move.
///
/// The first group of variants comes from the rules themselves, the last three
/// from the session that the move was submitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    OffBoard { pos: Position },
    NoPieceAtSource { from: Position },
    NotYourPiece { from: Position, owner: Side },
    NotAdjacent { from: Position, to: Position },
    OnlyWombatsDig,
    DigOntoOccupiedCell { to: Position },
    DigOntoHole { to: Position },
    DestinationHoldsOwnPiece { to: Position },
    NotYourTurn { current_turn: Side },
    GameNotInProgress,
    NotSeated,
}

impl std::error::Error for IllegalMove {}

impl std::fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IllegalMove::OffBoard { pos } => write!(f, "Position {} is not on the board", pos),
            IllegalMove::NoPieceAtSource { from } => write!(f, "There is no piece at {}", from),
            IllegalMove::NotYourPiece { from, owner } => {
                write!(f, "The piece at {} belongs to the {} side", from, owner)
            }
            IllegalMove::NotAdjacent { from, to } => write!(
                f,
                "{} is not orthogonally adjacent to {}",
                to, from
            ),
            IllegalMove::OnlyWombatsDig => write!(f, "Only wombats can dig"),
            IllegalMove::DigOntoOccupiedCell { to } => {
                write!(f, "Cannot dig at {}, the cell is occupied", to)
            }
            IllegalMove::DigOntoHole { to } => write!(f, "There already is a hole at {}", to),
            IllegalMove::DestinationHoldsOwnPiece { to } => {
                write!(f, "Cannot move onto your own piece at {}", to)
            }
            IllegalMove::NotYourTurn { current_turn } => {
                write!(f, "It is the {} side's turn", current_turn)
            }
            IllegalMove::GameNotInProgress => write!(f, "The game is not in progress"),
            IllegalMove::NotSeated => write!(f, "You are not playing in this game"),
        }
    }
}
