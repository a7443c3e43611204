use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::trace;
use wombat::{Action, GameState, Move, Side};

use crate::Bot;

const CAPTURE_BONUS: i32 = 100;
const DIG_BONUS: i32 = 30;
const DIG_THREAT_BONUS: i32 = 20;
const EXPOSED_WOMBAT_PENALTY: i32 = 25;
const JACKAL_INTO_HOLE_PENALTY: i32 = 1000;
/// How many of the best-scored moves to choose from.
const TOP_CHOICES: usize = 3;

/// Scores every legal move with a fixed set of heuristics and picks randomly
/// among the best few, so that it does not always play the same game.
pub struct HeuristicBot {
    rng: StdRng,
}

impl HeuristicBot {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

/// Scores a move for the side to move. Higher is better.
pub fn score_move(state: &GameState, mv: Move) -> i32 {
    let me = state.current_turn;
    let opponent = me.other();
    let board = &state.board;
    let mut score = 0;

    if board.get(mv.to).is_some_and(|p| p.side() == opponent) {
        score += CAPTURE_BONUS;
    }

    if mv.action == Action::Dig {
        score += DIG_BONUS;
        // The new hole is a trap for the opposing pieces next to it
        let threatened = mv
            .to
            .neighbors()
            .filter(|&pos| board.get(pos).is_some_and(|p| p.side() == opponent))
            .count();
        score += DIG_THREAT_BONUS * threatened as i32;
    }

    // (7 - distance to the center) * 2, where the doubled distance is integral
    score += 14 - mv.to.doubled_center_distance();

    let mover = board.get(mv.from).map(|p| p.side());
    if mover == Some(Side::Wombat) {
        let adjacent_jackals = mv
            .to
            .neighbors()
            .filter(|&pos| board.get(pos).is_some_and(|p| p.is_jackal()))
            .count();
        score -= EXPOSED_WOMBAT_PENALTY * adjacent_jackals as i32;
    }

    // Never listed as a legal move, but a jackal must not walk into a hole either way
    if mover == Some(Side::Jackal) && state.holes.contains(mv.to) {
        score -= JACKAL_INTO_HOLE_PENALTY;
    }

    score
}

impl Bot for HeuristicBot {
    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        let mut scored: Vec<(i32, Move)> = state
            .legal_moves()
            .into_iter()
            .map(|mv| (score_move(state, mv), mv))
            .collect();
        // Stable, so equal scores keep their enumeration order
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(TOP_CHOICES);
        trace!(?scored, "Top moves");
        scored.choose(&mut self.rng).map(|&(_, mv)| mv)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use wombat::{Board, Holes, Piece, Position};

    use super::*;

    fn pos(row: i8, col: i8) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn scores() {
        let state = GameState {
            board: Board::from_pieces([
                (pos(4, 4), Piece::WOMBAT),
                (pos(3, 4), Piece::JACKAL),
                (pos(4, 6), Piece::JACKAL),
            ]),
            holes: Holes::new(),
            current_turn: Side::Wombat,
        };
        // Capture at (3, 4): 100 + (7 - 1) * 2
        assert_eq!(score_move(&state, Move::step(pos(4, 4), pos(3, 4))), 112);
        // Digging at (4, 5) threatens the jackal at (4, 6): 30 + 20 + (7 - 2) * 2 - 25
        assert_eq!(score_move(&state, Move::dig(pos(4, 4), pos(4, 5))), 35);
        // Stepping to (5, 4) is safe: (7 - 2) * 2
        assert_eq!(score_move(&state, Move::step(pos(4, 4), pos(5, 4))), 10);
    }

    #[test]
    fn jackal_into_hole_is_heavily_penalized() {
        let state = GameState {
            board: Board::from_pieces([(pos(3, 3), Piece::JACKAL), (pos(7, 7), Piece::WOMBAT)]),
            holes: Holes::new().insert(pos(4, 3)),
            current_turn: Side::Jackal,
        };
        assert!(score_move(&state, Move::step(pos(3, 3), pos(4, 3))) < -900);
    }

    #[test]
    fn capture_ranks_first() {
        let state = GameState {
            board: Board::from_pieces([
                (pos(0, 0), Piece::WOMBAT),
                (pos(0, 1), Piece::JACKAL),
                (pos(7, 7), Piece::JACKAL),
            ]),
            holes: Holes::new(),
            current_turn: Side::Wombat,
        };
        let mut scored: Vec<_> = state
            .legal_moves()
            .into_iter()
            .map(|mv| score_move(&state, mv))
            .collect();
        scored.sort_unstable_by(|a, b| b.cmp(a));
        assert!(scored[0] >= 100);
        assert!(scored[1] < 100);
    }

    #[test]
    fn picks_among_the_top_three() {
        let state = GameState {
            board: Board::from_pieces([
                (pos(4, 4), Piece::WOMBAT),
                (pos(3, 4), Piece::JACKAL),
                (pos(4, 6), Piece::JACKAL),
            ]),
            holes: Holes::new(),
            current_turn: Side::Wombat,
        };
        let mut scored: Vec<_> = state
            .legal_moves()
            .into_iter()
            .map(|mv| score_move(&state, mv))
            .collect();
        assert_eq!(scored.len(), 7);
        scored.sort_unstable_by(|a, b| b.cmp(a));
        let third = scored[TOP_CHOICES - 1];
        assert!(third > scored[TOP_CHOICES]);

        let mut picked = std::collections::HashSet::new();
        for seed in 0..50 {
            let mut bot = HeuristicBot::new(StdRng::seed_from_u64(seed));
            let mv = bot.choose_move(&state).unwrap();
            assert!(score_move(&state, mv) >= third, "{} is not among the best", mv);
            picked.insert(mv);
        }
        assert!(picked.len() > 1);
    }

    #[test]
    fn no_moves_no_choice() {
        let state = GameState {
            board: Board::from_pieces([(pos(0, 0), Piece::JACKAL)]),
            holes: Holes::from_iter([pos(0, 1), pos(1, 0)]),
            current_turn: Side::Jackal,
        };
        let mut bot = HeuristicBot::new(StdRng::seed_from_u64(0));
        assert_eq!(bot.choose_move(&state), None);
    }
}
