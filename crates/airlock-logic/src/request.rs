//! Door open-request state machine and geometric classification.
//!
//! A wide airlock door has two independently openable halves. An agent
//! crossing one of the door's cells needs exactly one of four request
//! kinds, chosen from where the target cell sits relative to the door
//! anchor and which way the agent is heading.

use serde::{Deserialize, Serialize};

/// Lifecycle of a single open request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    /// No one is asking for this side.
    #[default]
    Idle,
    /// An agent is waiting on this side to open.
    Queued,
    /// The request was completed or canceled.
    Done,
}

/// A cancelable unit of work representing "open this side of the door".
///
/// Lifetime is bound to its parent door; requests are never owned by the
/// agents that queue them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorRequest {
    state: RequestState,
}

impl DoorRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the request queued. No-op if it is already queued.
    pub fn queue(&mut self) {
        if self.state != RequestState::Queued {
            self.state = RequestState::Queued;
        }
    }

    /// Complete the request. Safe to call repeatedly and when never queued.
    pub fn finish(&mut self) {
        if self.state == RequestState::Queued {
            self.state = RequestState::Done;
        }
    }

    pub fn is_queued(&self) -> bool {
        self.state == RequestState::Queued
    }

    pub fn state(&self) -> RequestState {
        self.state
    }
}

/// The four directional reasons a door side must open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorRequestKind {
    EnterLeft,
    EnterRight,
    ExitLeft,
    ExitRight,
}

impl DoorRequestKind {
    /// All kinds, in slot order.
    pub const ALL: [DoorRequestKind; 4] = [
        DoorRequestKind::EnterLeft,
        DoorRequestKind::EnterRight,
        DoorRequestKind::ExitLeft,
        DoorRequestKind::ExitRight,
    ];

    /// Whether this request is serviced by the door's left half.
    pub fn uses_left_side(self) -> bool {
        matches!(self, DoorRequestKind::EnterLeft | DoorRequestKind::ExitLeft)
    }

    /// Whether this request is serviced by the door's right half.
    pub fn uses_right_side(self) -> bool {
        !self.uses_left_side()
    }

    /// Stable slot index for storage inside a door.
    pub fn slot(self) -> usize {
        match self {
            DoorRequestKind::EnterLeft => 0,
            DoorRequestKind::EnterRight => 1,
            DoorRequestKind::ExitLeft => 2,
            DoorRequestKind::ExitRight => 3,
        }
    }
}

/// Classify which request a traversal needs.
///
/// `door_dx` is the target cell's column relative to the door's base
/// cell; `nav_dx` is the target cell's column relative to the agent's
/// current cell. The center cell (`door_dx == 0`) is always passable and
/// needs no request.
pub fn classify(door_dx: i32, nav_dx: i32) -> Option<DoorRequestKind> {
    if door_dx > 0 {
        // Right half of the door is being used.
        if nav_dx > 0 {
            Some(DoorRequestKind::EnterRight)
        } else {
            Some(DoorRequestKind::ExitRight)
        }
    } else if door_dx < 0 {
        // Left half.
        if nav_dx > 0 {
            Some(DoorRequestKind::ExitLeft)
        } else {
            Some(DoorRequestKind::EnterLeft)
        }
    } else {
        None
    }
}
