use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Board, Holes, IllegalMove, Piece, Position, Side};

/// What a piece does to the adjacent cell it targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Step onto the cell, capturing an opposing piece there.
    Move,
    /// Turn the (empty) cell into a hole. Wombats only. The piece stays put.
    Dig,
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "move" | "m" => Ok(Action::Move),
            "dig" | "d" => Ok(Action::Dig),
            other => Err(format!("'{}' is not an action, expected 'move' or 'dig'", other)),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub action: Action,
}

impl Move {
    pub fn step(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            action: Action::Move,
        }
    }

    pub fn dig(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            action: Action::Dig,
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self.action {
            Action::Move => "->",
            Action::Dig => "digs",
        };
        write!(f, "({}) {} ({})", self.from, verb, self.to)
    }
}

/// Enumerates the legal moves for `side`.
///
/// Cells are visited in row-major order, and for each piece the directions
/// up, down, left, right; per direction a `move` comes before a `dig`.
///
/// A jackal stepping into a hole is not listed. It is still accepted by
/// [`GameState::calculate()`], which resolves it as [`MoveEffect::JackalIntoHole`].
pub fn legal_moves(board: &Board, holes: Holes, side: Side) -> Vec<Move> {
    let mut moves = Vec::new();
    for from in board.pieces_of(side) {
        let is_wombat = side == Side::Wombat;
        for to in from.neighbors() {
            let target = board.get(to);
            let enterable = target.map_or(true, |piece| piece.side() != side);
            if enterable && (is_wombat || !holes.contains(to)) {
                moves.push(Move::step(from, to));
            }
            if is_wombat && target.is_none() && !holes.contains(to) {
                moves.push(Move::dig(from, to));
            }
        }
    }
    moves
}

/// Applies a move without validating it.
///
/// A dig adds its target to the holes. A move relocates the piece, overwriting
/// whatever stood on the target cell. A move with an end off the board changes
/// nothing.
pub fn apply_move(board: &Board, holes: Holes, mv: Move) -> (Board, Holes) {
    let mut board = *board;
    if !mv.from.is_on_board() || !mv.to.is_on_board() {
        return (board, holes);
    }
    match mv.action {
        Action::Dig => (board, holes.insert(mv.to)),
        Action::Move => {
            if let Some(piece) = board.remove(mv.from) {
                board.place(mv.to, piece);
            }
            (board, holes)
        }
    }
}

/// A jackal that steps into a hole is removed from the game.
///
/// Nothing lands on the hole and no hole is created or filled.
pub fn jackal_enters_hole(board: &Board, from: Position, to: Position) -> Board {
    debug_assert_eq!(from.manhattan_distance(to), 1);
    let mut board = *board;
    let removed = board.remove(from);
    debug_assert_eq!(removed, Some(Piece::JACKAL));
    board
}

/// A side without pieces has lost.
pub fn winner(board: &Board) -> Option<Side> {
    let wombats = board.count(Side::Wombat);
    let jackals = board.count(Side::Jackal);
    match (wombats, jackals) {
        (0, 0) => None,
        (0, _) => Some(Side::Jackal),
        (_, 0) => Some(Side::Wombat),
        _ => None,
    }
}

/// How to treat a side that has no legal moves on its turn.
///
/// The base rules do not say, so this is a configurable choice.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalemateRule {
    /// Nothing happens. The stuck side can only play a suicidal jackal step, if any.
    #[default]
    Continue,
    /// The turn goes back to the opponent, if the opponent can move.
    Pass,
    /// The side that cannot move loses.
    Forfeit,
}

impl FromStr for StalemateRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(StalemateRule::Continue),
            "pass" => Ok(StalemateRule::Pass),
            "forfeit" => Ok(StalemateRule::Forfeit),
            other => Err(format!(
                "'{}' is not a stalemate rule, expected 'continue', 'pass' or 'forfeit'",
                other
            )),
        }
    }
}

/// The whole rules-relevant state of a game.
///
/// This is a small [`Copy`] value, so simulations work on their own copies and
/// can never disturb the state they started from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub board: Board,
    pub holes: Holes,
    pub current_turn: Side,
}

/// What a validated move does.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveEffect {
    Relocate { captured: Option<Piece> },
    Dig,
    JackalIntoHole,
}

/// The result of [`GameState::calculate()`].
///
/// Ties the state and the move together, so that only a validated move can be executed.
#[derive(Debug)]
pub struct MoveCalculation<'a> {
    state: &'a GameState,
    pub mv: Move,
    pub effect: MoveEffect,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            holes: Holes::new(),
            current_turn: Side::Wombat,
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(&self.board, self.holes, self.current_turn)
    }

    pub fn winner(&self) -> Option<Side> {
        winner(&self.board)
    }

    /// Checks whether the side to move may play `mv` and what it would do.
    ///
    /// This does not modify the state; call [`MoveCalculation::execute()`]
    /// on the result to get the next state.
    pub fn calculate(&self, mv: Move) -> Result<MoveCalculation<'_>, IllegalMove> {
        let Move { from, to, action } = mv;
        for pos in [from, to] {
            if !pos.is_on_board() {
                return Err(IllegalMove::OffBoard { pos });
            }
        }
        let piece = self
            .board
            .get(from)
            .ok_or(IllegalMove::NoPieceAtSource { from })?;
        if piece.side() != self.current_turn {
            return Err(IllegalMove::NotYourPiece {
                from,
                owner: piece.side(),
            });
        }
        if from.manhattan_distance(to) != 1 {
            return Err(IllegalMove::NotAdjacent { from, to });
        }

        let target = self.board.get(to);
        let effect = match action {
            Action::Dig => {
                if !piece.is_wombat() {
                    return Err(IllegalMove::OnlyWombatsDig);
                }
                if target.is_some() {
                    return Err(IllegalMove::DigOntoOccupiedCell { to });
                }
                if self.holes.contains(to) {
                    return Err(IllegalMove::DigOntoHole { to });
                }
                MoveEffect::Dig
            }
            Action::Move => {
                if target.is_some_and(|t| t.side() == piece.side()) {
                    return Err(IllegalMove::DestinationHoldsOwnPiece { to });
                }
                if piece.is_jackal() && self.holes.contains(to) {
                    MoveEffect::JackalIntoHole
                } else {
                    MoveEffect::Relocate { captured: target }
                }
            }
        };

        Ok(MoveCalculation {
            state: self,
            mv,
            effect,
        })
    }

    /// Plays a move that is known to be legal, e.g. one from [`Self::legal_moves()`],
    /// and passes the turn.
    #[must_use]
    pub fn play_unchecked(&self, mv: Move) -> GameState {
        let (board, holes) = apply_move(&self.board, self.holes, mv);
        GameState {
            board,
            holes,
            current_turn: self.current_turn.other(),
        }
    }

    /// Applies the stalemate rule to the side to move.
    ///
    /// Returns the winner if the rule ended the game.
    pub fn settle_stalemate(&mut self, rule: StalemateRule) -> Option<Side> {
        if rule == StalemateRule::Continue || !self.legal_moves().is_empty() {
            return None;
        }
        match rule {
            StalemateRule::Continue => None,
            StalemateRule::Pass => {
                let opponent = self.current_turn.other();
                if !legal_moves(&self.board, self.holes, opponent).is_empty() {
                    self.current_turn = opponent;
                }
                None
            }
            StalemateRule::Forfeit => Some(self.current_turn.other()),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> MoveCalculation<'a> {
    /// Apply the move and pass the turn to the other side.
    pub fn execute(self) -> GameState {
        let GameState {
            board,
            holes,
            current_turn,
        } = *self.state;
        let (board, holes) = match self.effect {
            MoveEffect::JackalIntoHole => (jackal_enters_hole(&board, self.mv.from, self.mv.to), holes),
            MoveEffect::Dig | MoveEffect::Relocate { .. } => apply_move(&board, holes, self.mv),
        };
        GameState {
            board,
            holes,
            current_turn: current_turn.other(),
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::ArbitraryState;

    fn pos(row: i8, col: i8) -> Position {
        Position::new(row, col)
    }

    quickcheck! {
        fn legal_moves_stay_adjacent_and_on_board(input: ArbitraryState) -> bool {
            let state = input.0;
            legal_moves(&state.board, state.holes, state.current_turn)
                .into_iter()
                .all(|mv| mv.to.is_on_board() && mv.from.manhattan_distance(mv.to) == 1)
        }

        fn legal_moves_pass_validation(input: ArbitraryState) -> bool {
            let state = input.0;
            state.legal_moves().into_iter().all(|mv| {
                matches!(
                    state.calculate(mv).map(|calc| calc.effect),
                    Ok(MoveEffect::Relocate { .. }) | Ok(MoveEffect::Dig)
                )
            })
        }

        fn dig_is_legal_iff_target_is_free_and_digger_is_a_wombat(input: ArbitraryState) -> bool {
            let state = input.0;
            let listed = state.legal_moves();
            let ok = state.board.pieces_of(state.current_turn).all(|from| {
                from.neighbors().all(|to| {
                    let dig = Move::dig(from, to);
                    let expected = state.current_turn == Side::Wombat
                        && state.board.is_empty_at(to)
                        && !state.holes.contains(to);
                    state.calculate(dig).is_ok() == expected && listed.contains(&dig) == expected
                })
            });
            ok
        }

        fn moving_relocates_the_piece(input: ArbitraryState) -> bool {
            let state = input.0;
            state.legal_moves().into_iter().filter(|mv| mv.action == Action::Move).all(|mv| {
                let captured = state.board.get(mv.to).is_some();
                let next = state.calculate(mv).unwrap().execute();
                let expected_total = state.board.total() - usize::from(captured);
                next.board.get(mv.to) == state.board.get(mv.from)
                    && next.board.get(mv.from).is_none()
                    && next.board.total() == expected_total
                    && next.holes == state.holes
                    && next.current_turn == state.current_turn.other()
            })
        }

        fn jackal_falling_into_a_hole_disappears(input: ArbitraryState) -> bool {
            let mut state = input.0;
            state.current_turn = Side::Jackal;
            let ok = state.board.pieces_of(Side::Jackal).all(|from| {
                from.neighbors().filter(|&to| state.holes.contains(to)).all(|to| {
                    let next = state.calculate(Move::step(from, to)).unwrap().execute();
                    next.board.get(from).is_none()
                        && next.board.get(to) == state.board.get(to)
                        && next.board.count(Side::Jackal) + 1 == state.board.count(Side::Jackal)
                        && next.holes == state.holes
                })
            });
            ok
        }

        fn winner_matches_piece_counts(input: ArbitraryState) -> bool {
            let board = input.0.board;
            let (w, j) = (board.count(Side::Wombat), board.count(Side::Jackal));
            let expected = if j == 0 && w > 0 {
                Some(Side::Wombat)
            } else if w == 0 && j > 0 {
                Some(Side::Jackal)
            } else {
                None
            };
            winner(&board) == expected
        }
    }

    #[test]
    fn opening_moves() {
        let state = GameState::new();
        let moves = state.legal_moves();
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|mv| mv.from.row >= 6));
        assert!(moves.iter().all(|mv| state.board.get(mv.from) == Some(Piece::WOMBAT)));
        // Nothing is adjacent to an opposing piece yet, and no wombat touches another one
        assert!(moves.iter().all(|mv| state.board.is_empty_at(mv.to)));
        assert_eq!(moves.iter().filter(|mv| mv.action == Action::Dig).count(), moves.len() / 2);
        assert!(moves.contains(&Move::step(pos(6, 0), pos(5, 0))));
        assert!(moves.contains(&Move::dig(pos(6, 0), pos(5, 0))));
        // The back row can move sideways, and up into the gaps of row 6
        assert!(moves.contains(&Move::dig(pos(7, 1), pos(7, 0))));
        assert!(moves.contains(&Move::step(pos(7, 1), pos(6, 1))));
        assert!(state.calculate(Move::step(pos(7, 1), pos(6, 1))).is_ok());
    }

    #[test]
    fn enumeration_order() {
        let board = Board::from_pieces([(pos(3, 3), Piece::WOMBAT)]);
        let moves = legal_moves(&board, Holes::new(), Side::Wombat);
        assert_eq!(
            moves,
            vec![
                Move::step(pos(3, 3), pos(2, 3)),
                Move::dig(pos(3, 3), pos(2, 3)),
                Move::step(pos(3, 3), pos(4, 3)),
                Move::dig(pos(3, 3), pos(4, 3)),
                Move::step(pos(3, 3), pos(3, 2)),
                Move::dig(pos(3, 3), pos(3, 2)),
                Move::step(pos(3, 3), pos(3, 4)),
                Move::dig(pos(3, 3), pos(3, 4)),
            ]
        );
    }

    #[test]
    fn jackals_avoid_holes_but_wombats_do_not() {
        let board = Board::from_pieces([(pos(3, 3), Piece::JACKAL), (pos(5, 5), Piece::WOMBAT)]);
        let holes = Holes::from_iter([pos(4, 3), pos(4, 5)]);
        let jackal_moves = legal_moves(&board, holes, Side::Jackal);
        assert_eq!(jackal_moves.len(), 3);
        assert!(!jackal_moves.iter().any(|mv| mv.to == pos(4, 3)));
        let wombat_moves = legal_moves(&board, holes, Side::Wombat);
        assert!(wombat_moves.contains(&Move::step(pos(5, 5), pos(4, 5))));
        assert!(!wombat_moves.contains(&Move::dig(pos(5, 5), pos(4, 5))));
    }

    #[test]
    fn unchecked_moves_off_the_board_change_nothing() {
        let board = Board::from_pieces([(pos(0, 0), Piece::WOMBAT), (pos(7, 7), Piece::JACKAL)]);
        let holes = Holes::new();
        for mv in [
            Move::step(pos(0, 0), pos(-1, 0)),
            Move::dig(pos(7, 7), pos(8, 7)),
            Move::step(pos(8, 0), pos(7, 0)),
        ] {
            assert_eq!(apply_move(&board, holes, mv), (board, holes));
        }
        // Sanity check that a regular step still moves the piece
        let (moved, _) = apply_move(&board, holes, Move::step(pos(0, 0), pos(1, 0)));
        assert_eq!(moved.get(pos(1, 0)), Some(Piece::WOMBAT));
    }

    #[test]
    fn capture() {
        let state = GameState {
            board: Board::from_pieces([(pos(4, 4), Piece::WOMBAT), (pos(3, 4), Piece::JACKAL)]),
            holes: Holes::new(),
            current_turn: Side::Wombat,
        };
        let calc = state.calculate(Move::step(pos(4, 4), pos(3, 4))).unwrap();
        assert_eq!(
            calc.effect,
            MoveEffect::Relocate {
                captured: Some(Piece::JACKAL)
            }
        );
        let next = calc.execute();
        assert_eq!(next.board.get(pos(3, 4)), Some(Piece::WOMBAT));
        assert_eq!(next.board.total(), 1);
        assert_eq!(next.winner(), Some(Side::Wombat));
        assert_eq!(next.current_turn, Side::Jackal);
    }

    #[test]
    fn rejected_moves() {
        let state = GameState::new();
        let cases = [
            (Move::step(pos(6, 0), pos(-1, 0)), IllegalMove::OffBoard { pos: pos(-1, 0) }),
            (Move::step(pos(5, 0), pos(4, 0)), IllegalMove::NoPieceAtSource { from: pos(5, 0) }),
            (
                Move::step(pos(1, 1), pos(2, 1)),
                IllegalMove::NotYourPiece {
                    from: pos(1, 1),
                    owner: Side::Jackal,
                },
            ),
            (
                Move::step(pos(6, 0), pos(4, 0)),
                IllegalMove::NotAdjacent {
                    from: pos(6, 0),
                    to: pos(4, 0),
                },
            ),
            (
                Move::dig(pos(6, 0), pos(5, 1)),
                IllegalMove::NotAdjacent {
                    from: pos(6, 0),
                    to: pos(5, 1),
                },
            ),
            (
                Move::step(pos(7, 1), pos(7, 1)),
                IllegalMove::NotAdjacent {
                    from: pos(7, 1),
                    to: pos(7, 1),
                },
            ),
        ];
        for (mv, expected) in cases {
            assert_eq!(state.calculate(mv).unwrap_err(), expected, "{}", mv);
        }
    }

    #[test]
    fn cannot_step_on_own_piece_or_dig_twice() {
        let state = GameState {
            board: Board::from_pieces([(pos(6, 0), Piece::WOMBAT), (pos(6, 1), Piece::WOMBAT)]),
            holes: Holes::new().insert(pos(5, 0)),
            current_turn: Side::Wombat,
        };
        assert_eq!(
            state.calculate(Move::step(pos(6, 0), pos(6, 1))).unwrap_err(),
            IllegalMove::DestinationHoldsOwnPiece { to: pos(6, 1) }
        );
        assert_eq!(
            state.calculate(Move::dig(pos(6, 0), pos(5, 0))).unwrap_err(),
            IllegalMove::DigOntoHole { to: pos(5, 0) }
        );
        assert_eq!(
            state.calculate(Move::dig(pos(6, 0), pos(6, 1))).unwrap_err(),
            IllegalMove::DigOntoOccupiedCell { to: pos(6, 1) }
        );
        let jackal_turn = GameState {
            board: Board::from_pieces([(pos(0, 0), Piece::JACKAL)]),
            holes: Holes::new(),
            current_turn: Side::Jackal,
        };
        assert_eq!(
            jackal_turn.calculate(Move::dig(pos(0, 0), pos(0, 1))).unwrap_err(),
            IllegalMove::OnlyWombatsDig
        );
    }

    #[test]
    fn dig_keeps_the_digger_in_place() {
        let state = GameState::new();
        let next = state
            .calculate(Move::dig(pos(6, 2), pos(5, 2)))
            .unwrap()
            .execute();
        assert_eq!(next.board, state.board);
        assert_eq!(next.holes, Holes::new().insert(pos(5, 2)));
        assert_eq!(next.current_turn, Side::Jackal);
    }

    #[test]
    fn jackal_attacking_a_wombat_on_a_hole_falls_in() {
        let state = GameState {
            board: Board::from_pieces([(pos(3, 3), Piece::JACKAL), (pos(4, 3), Piece::WOMBAT)]),
            holes: Holes::new().insert(pos(4, 3)),
            current_turn: Side::Jackal,
        };
        let calc = state.calculate(Move::step(pos(3, 3), pos(4, 3))).unwrap();
        assert_eq!(calc.effect, MoveEffect::JackalIntoHole);
        let next = calc.execute();
        assert_eq!(next.board.get(pos(4, 3)), Some(Piece::WOMBAT));
        assert_eq!(next.board.get(pos(3, 3)), None);
        assert_eq!(next.winner(), Some(Side::Wombat));
    }

    #[test]
    fn stalemate_rules() {
        // The jackal is boxed in by holes, so it has no legal moves
        let stuck = GameState {
            board: Board::from_pieces([(pos(0, 0), Piece::JACKAL), (pos(7, 7), Piece::WOMBAT)]),
            holes: Holes::from_iter([pos(1, 0), pos(0, 1)]),
            current_turn: Side::Jackal,
        };
        assert!(stuck.legal_moves().is_empty());

        let mut state = stuck;
        assert_eq!(state.settle_stalemate(StalemateRule::Continue), None);
        assert_eq!(state, stuck);

        let mut state = stuck;
        assert_eq!(state.settle_stalemate(StalemateRule::Pass), None);
        assert_eq!(state.current_turn, Side::Wombat);

        let mut state = stuck;
        assert_eq!(state.settle_stalemate(StalemateRule::Forfeit), Some(Side::Wombat));

        let mut playable = GameState::new();
        assert_eq!(playable.settle_stalemate(StalemateRule::Forfeit), None);
    }

    #[test]
    fn parse_config_values() {
        assert_eq!("Forfeit".parse(), Ok(StalemateRule::Forfeit));
        assert!("draw".parse::<StalemateRule>().is_err());
        assert_eq!("dig".parse(), Ok(Action::Dig));
    }
}
