//! Layout generation - builds a populated world from a manifest.
//!
//! The manifest is plain JSON (grid extent, door anchors, agent count)
//! so the same file drives the headless harness and any future host.

use crate::engine::SimulationEngine;
use airlock_logic::grid::GridCell;
use airlock_logic::nav::{NavMode, NavProfile};
use hecs::Entity;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A door placement in the manifest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DoorSpec {
    /// Base (anchor) cell column.
    pub x: i32,
    /// Base cell row.
    pub y: i32,
    /// Whether construction is already finished. Defaults to true.
    #[serde(default = "default_completed")]
    pub completed: bool,
}

fn default_completed() -> bool {
    true
}

/// Declarative description of a demo layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutManifest {
    pub name: String,
    /// Grid extent in cells.
    pub columns: i32,
    pub rows: i32,
    pub doors: Vec<DoorSpec>,
    /// Number of agents to scatter across the grid.
    pub agents: u32,
    /// Optional override for which nav modes are single height.
    #[serde(default)]
    pub nav_profile: Option<NavProfile>,
}

impl LayoutManifest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Entities created by [`build_layout`].
#[derive(Debug, Default)]
pub struct Layout {
    pub doors: Vec<Entity>,
    pub agents: Vec<Entity>,
}

/// Populate `engine` from a manifest, scattering agents on cells no
/// door occupies.
pub fn build_layout(
    engine: &mut SimulationEngine,
    manifest: &LayoutManifest,
    rng: &mut impl Rng,
) -> Layout {
    let mut layout = Layout::default();

    for spec in &manifest.doors {
        let door = engine.spawn_door(GridCell::new(spec.x, spec.y));
        if spec.completed {
            engine.complete_construction(door);
        }
        layout.doors.push(door);
    }

    for _ in 0..manifest.agents {
        let cell = random_free_cell(engine, manifest, rng);
        let mode = if rng.gen_bool(0.25) {
            NavMode::Tube
        } else {
            NavMode::Floor
        };
        layout.agents.push(engine.spawn_agent(cell, mode));
    }

    layout
}

fn random_free_cell(
    engine: &SimulationEngine,
    manifest: &LayoutManifest,
    rng: &mut impl Rng,
) -> GridCell {
    // Door cells are rare; rejection sampling converges immediately on
    // any sane layout.
    for _ in 0..64 {
        let cell = GridCell::new(
            rng.gen_range(0..manifest.columns.max(1)),
            rng.gen_range(0..manifest.rows.max(1)),
        );
        if engine.door_at(cell).is_none() {
            return cell;
        }
    }
    GridCell::new(0, 0)
}
