//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no scheduling behavior - that lives in systems.

mod door;
mod navigator;

pub use door::*;
pub use navigator::*;
