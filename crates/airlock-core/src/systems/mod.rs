//! Systems - logic that operates on components

mod door;
mod movement;
mod traversal;

pub use door::*;
pub use movement::*;
pub use traversal::*;
