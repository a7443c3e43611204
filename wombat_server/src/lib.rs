mod coordinator;
mod error;
mod local;
mod session;
mod transport;
pub use coordinator::*;
pub use error::*;
pub use local::*;
pub use session::*;
pub use transport::*;

use wombat::StalemateRule;

pub struct Config {
    pub rng: rand::rngs::StdRng,
    pub stalemate: StalemateRule,
}
