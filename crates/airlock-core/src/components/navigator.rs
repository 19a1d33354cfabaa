//! Agent-side components: navigator, active transition, pending doors.

use airlock_logic::grid::{CellOffset, GridCell};
use airlock_logic::nav::NavMode;
use airlock_logic::request::DoorRequestKind;
use hecs::Entity;
use serde::{Deserialize, Serialize};

/// A navigating agent's position and movement mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Navigator {
    pub cell: GridCell,
    pub mode: NavMode,
}

impl Navigator {
    pub fn new(cell: GridCell, mode: NavMode) -> Self {
        Self { cell, mode }
    }
}

/// Whether a transition is progressing or held at a yield point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    /// Free to complete on the next movement pass.
    Advancing,
    /// Held at the start cell until every pending door reports open.
    /// Re-evaluated once per tick by the traversal system.
    Waiting,
}

/// A single atomic movement attempt - present only while in progress.
#[derive(Debug, Clone)]
pub struct ActiveTransition {
    /// Displacement from the agent's current cell to the target cell.
    pub offset: CellOffset,
    /// Extra cells (relative to the current cell) this movement type
    /// must also check for blocking doors.
    pub void_offsets: Vec<CellOffset>,
    pub state: TransitionState,
}

impl ActiveTransition {
    pub fn new(offset: CellOffset, void_offsets: Vec<CellOffset>) -> Self {
        Self {
            offset,
            void_offsets,
            state: TransitionState::Advancing,
        }
    }
}

/// The doors gating an agent's active transition, each mapped to the
/// request kind queued on it.
///
/// Holds non-owning entity handles only; doors belong to the world. The
/// mapping is populated by `begin_transition` and must be emptied (with
/// matching finishes) at every transition boundary.
#[derive(Debug, Clone, Default)]
pub struct PendingDoors {
    doors: Vec<(Entity, DoorRequestKind)>,
}

impl PendingDoors {
    /// A transition inspects at most the target cell, the cell above it,
    /// and the configured void offsets.
    pub fn new() -> Self {
        Self {
            doors: Vec::with_capacity(4),
        }
    }

    /// Record a door if it is not already mapped. Returns false (and
    /// changes nothing) when the door is already present.
    pub fn insert(&mut self, door: Entity, kind: DoorRequestKind) -> bool {
        if self.contains(door) {
            return false;
        }
        self.doors.push((door, kind));
        true
    }

    pub fn contains(&self, door: Entity) -> bool {
        self.doors.iter().any(|(entity, _)| *entity == door)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, DoorRequestKind)> + '_ {
        self.doors.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.doors.len()
    }

    /// Empty the mapping, yielding the entries so the caller can finish
    /// each request exactly once.
    pub fn drain(&mut self) -> Vec<(Entity, DoorRequestKind)> {
        std::mem::take(&mut self.doors)
    }
}
