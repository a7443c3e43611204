use tracing::debug;
use wombat::{legal_moves, GameState, Move, Side};

use crate::Bot;

pub const DEFAULT_DEPTH: u32 = 2;
/// Only the first few moves in enumeration order are searched at each ply.
pub const DEFAULT_BRANCHING: usize = 5;
/// The score of a ply where the side to move has nothing to play.
pub const NO_MOVES_SCORE: i32 = 1000;

/// A shallow, width-limited minimax search.
///
/// Every simulated position is its own copy of the [`GameState`], so the
/// state passed to [`Bot::choose_move()`] is never touched.
#[derive(Clone, Copy, Debug)]
pub struct MinimaxBot {
    pub depth: u32,
    pub branching: usize,
}

impl MinimaxBot {
    pub fn new(depth: u32, branching: usize) -> Self {
        Self { depth, branching }
    }

    /// Returns the best score for `root` and the move leading to it.
    ///
    /// The side to move in `state` maximizes when `maximizing` is set.
    pub fn search(
        &self,
        state: &GameState,
        depth: u32,
        maximizing: bool,
        root: Side,
    ) -> (i32, Option<Move>) {
        if depth == 0 {
            return (evaluate(state, root), None);
        }
        let moves = state.legal_moves();
        if moves.is_empty() {
            let score = if maximizing {
                -NO_MOVES_SCORE
            } else {
                NO_MOVES_SCORE
            };
            return (score, None);
        }

        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_move = None;
        for mv in moves.into_iter().take(self.branching) {
            let child = state.play_unchecked(mv);
            let (score, _) = self.search(&child, depth - 1, !maximizing, root);
            let better = if maximizing {
                score > best_score
            } else {
                score < best_score
            };
            if better {
                best_score = score;
                best_move = Some(mv);
            }
        }
        (best_score, best_move)
    }
}

impl Default for MinimaxBot {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH, DEFAULT_BRANCHING)
    }
}

/// Static evaluation from the point of view of `side`: material plus mobility.
pub fn evaluate(state: &GameState, side: Side) -> i32 {
    let own = state.board.count(side) as i32;
    let opponent = state.board.count(side.other()) as i32;
    let mobility = legal_moves(&state.board, state.holes, side).len() as i32;
    (own - opponent) * 10 + mobility * 2
}

impl Bot for MinimaxBot {
    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        let (score, mv) = self.search(state, self.depth, true, state.current_turn);
        debug!(score, ?mv, "Minimax search finished");
        mv
    }
}
