//! Airlock Core - Door Traversal Simulation Engine
//!
//! An ECS-based simulation of agents navigating a cell grid occupied by
//! bidirectional airlock doors. Each door owns four open-request slots
//! (enter/exit, left/right); a per-agent traversal coordinator classifies
//! which requests a movement needs, queues them, and holds the agent in a
//! waiting transition until every gating door reports open.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) via `hecs`:
//! - **Entities**: doors and navigating agents
//! - **Components**: pure data (AirlockDoor, Navigator, ActiveTransition,
//!   PendingDoors)
//! - **Systems**: logic that queries and updates components each tick
//!
//! # Example
//!
//! ```rust,no_run
//! use airlock_core::prelude::*;
//! use airlock_logic::grid::{CellOffset, GridCell};
//! use airlock_logic::nav::NavMode;
//!
//! let mut engine = SimulationEngine::new();
//! let door = engine.spawn_door(GridCell::new(6, 5));
//! engine.complete_construction(door);
//! let agent = engine.spawn_agent(GridCell::new(4, 5), NavMode::Floor);
//!
//! engine.request_move(agent, CellOffset::new(1, 0), Vec::new());
//! while engine.is_moving(agent) {
//!     engine.update(1.0 / 5.0);
//! }
//! ```

pub mod components;
pub mod engine;
pub mod generation;
pub mod grid_index;
pub mod persistence;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::SimulationEngine;
    pub use crate::grid_index::DoorIndex;
}
