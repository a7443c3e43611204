pub use board::*;
pub use errors::*;
pub use holes::*;
pub use position::*;
pub use presenter::*;
pub use protocol::*;
pub use rules::*;
pub use side::*;
pub use visualization::*;

#[cfg(test)]
mod arbitrary;
mod board;
mod errors;
mod holes;
mod position;
mod presenter;
mod protocol;
mod rules;
mod side;
mod visualization;
