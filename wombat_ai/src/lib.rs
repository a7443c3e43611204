mod client;
mod heuristic;
mod minimax;
mod random;

pub use client::*;
pub use heuristic::*;
pub use minimax::*;
pub use random::*;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use wombat::{GameState, Move};

/// Anything that can pick a move for the side to move.
pub trait Bot {
    /// Returns `None` when the side to move has no legal moves.
    ///
    /// The state is only read; simulations happen on copies.
    fn choose_move(&mut self, state: &GameState) -> Option<Move>;
}

impl<B: Bot + ?Sized> Bot for Box<B> {
    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        (**self).choose_move(state)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Builds the bot for this difficulty. Bots without randomness ignore `rng`.
    pub fn bot(self, rng: StdRng) -> Box<dyn Bot + Send> {
        match self {
            Difficulty::Easy => Box::new(RandomBot::new(rng)),
            Difficulty::Medium => Box::new(HeuristicBot::new(rng)),
            Difficulty::Hard => Box::new(MinimaxBot::default()),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}
