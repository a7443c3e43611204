use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use wombat::{GameState, Move};

use crate::Bot;

/// Picks uniformly among all legal moves.
pub struct RandomBot {
    rng: StdRng,
}

impl RandomBot {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl Bot for RandomBot {
    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        state.legal_moves().choose(&mut self.rng).copied()
    }
}
