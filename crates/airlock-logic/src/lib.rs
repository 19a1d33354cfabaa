//! Pure traversal logic for the airlock simulation.
//!
//! This crate contains the logic that is independent of any ECS, engine,
//! or runtime. Functions take plain data and return results, making them
//! unit-testable and portable between the simulation core and native
//! validation tools.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`grid`] | Integer cell coordinates and offsets |
//! | [`nav`] | Navigation modes and the single-height profile |
//! | [`request`] | Door open-request state machine and classification |

pub mod grid;
pub mod nav;
pub mod request;
