//! Airlock door component: request slots, per-side open state, energy.

use airlock_logic::grid::GridCell;
use airlock_logic::request::{DoorRequest, DoorRequestKind, RequestState};
use serde::{Deserialize, Serialize};

/// Seconds for one door half to swing fully open or closed.
pub const SECONDS_TO_OPEN: f32 = 2.0;
/// Energy drawn from the door's buffer each time a half opens.
pub const ENERGY_PER_USE: f32 = 2000.0;
/// Energy the door's internal buffer can hold.
pub const ENERGY_CAPACITY: f32 = 10_000.0;
/// Charge rate of the buffer while the door is spawned, in joules/second.
pub const CHARGE_RATE: f32 = 120.0;

/// One independently openable half of a wide door.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct DoorHalf {
    /// 0.0 = fully closed, 1.0 = fully open.
    progress: f32,
    /// Whether the current opening cycle has been charged for.
    charged: bool,
}

impl DoorHalf {
    fn is_open(&self) -> bool {
        self.progress >= 1.0
    }
}

/// A bidirectional airlock door spanning three cells horizontally.
///
/// The door owns exactly four request slots, one per
/// [`DoorRequestKind`]. Open state per side is driven by
/// [`crate::systems::door_system`], which stands in for the external
/// animation/energy process: a side swings open while any request for
/// that side is queued, and relaxes closed otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirlockDoor {
    /// Placement anchor. The door spans `base_cell.x - 1 ..= base_cell.x + 1`.
    pub base_cell: GridCell,
    /// Destroyed or under-construction doors are inert and never gate traversal.
    pub spawned: bool,
    /// Energy currently stored in the door's buffer.
    pub stored_energy: f32,
    /// Total energy the door has drawn over its lifetime.
    pub energy_used: f64,
    requests: [DoorRequest; 4],
    left: DoorHalf,
    right: DoorHalf,
}

impl AirlockDoor {
    /// Create a door anchored at `base_cell`, initially under construction.
    pub fn new(base_cell: GridCell) -> Self {
        Self {
            base_cell,
            spawned: false,
            stored_energy: ENERGY_CAPACITY,
            energy_used: 0.0,
            requests: [DoorRequest::new(); 4],
            left: DoorHalf::default(),
            right: DoorHalf::default(),
        }
    }

    /// The three cells the door occupies, left to right.
    pub fn cells(&self) -> [GridCell; 3] {
        let base = self.base_cell;
        [
            GridCell::new(base.x - 1, base.y),
            base,
            GridCell::new(base.x + 1, base.y),
        ]
    }

    /// Queue the named request. No-op if that slot is already queued.
    pub fn queue(&mut self, kind: DoorRequestKind) {
        self.requests[kind.slot()].queue();
    }

    /// Finish the named request. Safe when idle, done, or never queued.
    pub fn finish(&mut self, kind: DoorRequestKind) {
        self.requests[kind.slot()].finish();
    }

    /// Force-finish every outstanding request (destroy handler).
    pub fn finish_all(&mut self) {
        for request in &mut self.requests {
            request.finish();
        }
    }

    pub fn request_state(&self, kind: DoorRequestKind) -> RequestState {
        self.requests[kind.slot()].state()
    }

    /// Whether any queued request needs the left half open.
    pub fn left_requested(&self) -> bool {
        DoorRequestKind::ALL
            .iter()
            .any(|kind| kind.uses_left_side() && self.requests[kind.slot()].is_queued())
    }

    /// Whether any queued request needs the right half open.
    pub fn right_requested(&self) -> bool {
        DoorRequestKind::ALL
            .iter()
            .any(|kind| kind.uses_right_side() && self.requests[kind.slot()].is_queued())
    }

    pub fn is_left_open(&self) -> bool {
        self.left.is_open()
    }

    pub fn is_right_open(&self) -> bool {
        self.right.is_open()
    }

    /// Whether the side serving `kind` currently reports open.
    pub fn is_open_for(&self, kind: DoorRequestKind) -> bool {
        if kind.uses_left_side() {
            self.is_left_open()
        } else {
            self.is_right_open()
        }
    }

    /// Advance both halves by `dt` seconds and recharge the buffer.
    ///
    /// A half only starts an opening cycle once the buffer can pay for
    /// it; a drained door simply stays shut, and whoever queued the
    /// request keeps waiting.
    pub fn advance(&mut self, dt: f32) {
        if !self.spawned {
            return;
        }
        self.stored_energy = (self.stored_energy + CHARGE_RATE * dt).min(ENERGY_CAPACITY);
        let left_wanted = self.left_requested();
        let right_wanted = self.right_requested();
        Self::advance_half(
            &mut self.left,
            left_wanted,
            dt,
            &mut self.stored_energy,
            &mut self.energy_used,
        );
        Self::advance_half(
            &mut self.right,
            right_wanted,
            dt,
            &mut self.stored_energy,
            &mut self.energy_used,
        );
    }

    fn advance_half(
        half: &mut DoorHalf,
        wanted: bool,
        dt: f32,
        stored: &mut f32,
        used: &mut f64,
    ) {
        let step = dt / SECONDS_TO_OPEN;
        if wanted {
            if !half.charged {
                if *stored < ENERGY_PER_USE {
                    return;
                }
                *stored -= ENERGY_PER_USE;
                *used += ENERGY_PER_USE as f64;
                half.charged = true;
            }
            half.progress = (half.progress + step).min(1.0);
        } else {
            half.progress = (half.progress - step).max(0.0);
            if half.progress <= 0.0 {
                half.charged = false;
            }
        }
    }
}
