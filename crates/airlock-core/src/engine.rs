//! Simulation engine - main entry point for running the simulation

use crate::components::*;
use crate::grid_index::DoorIndex;
use crate::systems::*;
use airlock_logic::grid::{CellOffset, GridCell};
use airlock_logic::nav::{NavMode, NavProfile};
use hecs::{Entity, World};

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing all doors and agents
    pub world: World,
    /// Simulation time in seconds since start
    pub sim_time: f64,
    /// Cell-to-door lookup
    door_index: DoorIndex,
    /// Which navigation modes are one cell tall
    nav_profile: NavProfile,
    /// Ticks processed so far
    tick: u64,
}

impl SimulationEngine {
    /// Create a new empty simulation with the default nav profile.
    pub fn new() -> Self {
        Self::with_profile(NavProfile::default())
    }

    /// Create a simulation with an externally supplied nav profile.
    pub fn with_profile(nav_profile: NavProfile) -> Self {
        Self {
            world: World::new(),
            sim_time: 0.0,
            door_index: DoorIndex::new(),
            nav_profile,
            tick: 0,
        }
    }

    /// Place an airlock door anchored at `base_cell` (under construction).
    pub fn spawn_door(&mut self, base_cell: GridCell) -> Entity {
        spawn_door(&mut self.world, &mut self.door_index, base_cell)
    }

    /// Finish a door's construction so it starts gating traversal.
    pub fn complete_construction(&mut self, door: Entity) {
        complete_construction(&mut self.world, door);
    }

    /// Deconstruct a door, force-finishing its outstanding requests.
    pub fn demolish_door(&mut self, door: Entity) {
        demolish_door(&mut self.world, &mut self.door_index, door);
    }

    /// Spawn a navigating agent at `cell`.
    pub fn spawn_agent(&mut self, cell: GridCell, mode: NavMode) -> Entity {
        self.world
            .spawn((Navigator::new(cell, mode), PendingDoors::new()))
    }

    /// Remove an agent, synchronously clearing its door requests first.
    pub fn despawn_agent(&mut self, agent: Entity) {
        clear_door_requests(&mut self.world, agent);
        let _ = self.world.despawn(agent);
    }

    /// Start a transition attempt: one atomic step by `offset`, with any
    /// extra void-offset cells the movement type must check. Replaces a
    /// transition already in progress (its requests are finished first).
    pub fn request_move(&mut self, agent: Entity, offset: CellOffset, void_offsets: Vec<CellOffset>) {
        if self.world.contains(agent) {
            let _ = self
                .world
                .insert_one(agent, ActiveTransition::new(offset, void_offsets));
            begin_transition(&mut self.world, &self.door_index, &self.nav_profile, agent);
        }
    }

    /// Abort an in-progress transition, finishing all mapped requests.
    pub fn cancel_transition(&mut self, agent: Entity) {
        clear_door_requests(&mut self.world, agent);
        let _ = self.world.remove_one::<ActiveTransition>(agent);
    }

    /// Advance the simulation by `dt` seconds: doors swing, held
    /// transitions are re-evaluated, advancing transitions complete.
    pub fn update(&mut self, dt: f32) {
        self.sim_time += dt as f64;
        self.tick += 1;

        door_system(&mut self.world, dt);
        traversal_system(&mut self.world);
        movement_system(&mut self.world);
    }

    /// Ticks processed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// The door occupying `cell`, spawned or not.
    pub fn door_at(&self, cell: GridCell) -> Option<Entity> {
        self.door_index.door_at(cell)
    }

    /// Whether `agent` is currently held waiting on doors.
    pub fn is_waiting(&self, agent: Entity) -> bool {
        self.world
            .get::<&ActiveTransition>(agent)
            .map(|transition| transition.state == TransitionState::Waiting)
            .unwrap_or(false)
    }

    /// Whether `agent` has a transition in progress at all.
    pub fn is_moving(&self, agent: Entity) -> bool {
        self.world.get::<&ActiveTransition>(agent).is_ok()
    }

    /// The agent's current cell.
    pub fn agent_cell(&self, agent: Entity) -> Option<GridCell> {
        self.world.get::<&Navigator>(agent).map(|nav| nav.cell).ok()
    }

    /// Count doors in the world.
    pub fn door_count(&self) -> usize {
        self.world.query::<&AirlockDoor>().iter().count()
    }

    /// Count agents in the world.
    pub fn agent_count(&self) -> usize {
        self.world.query::<&Navigator>().iter().count()
    }

    /// Save simulation state to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), crate::persistence::SaveError> {
        crate::persistence::save_simulation(
            writer,
            &self.world,
            self.sim_time,
            self.tick,
            &self.nav_profile,
        )
    }

    /// Load simulation state from a reader
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), crate::persistence::SaveError> {
        let loaded = crate::persistence::load_simulation(reader)?;

        self.world = loaded.world;
        self.sim_time = loaded.sim_time;
        self.tick = loaded.tick;
        self.nav_profile = loaded.nav_profile;

        // Entity handles changed, so the cell lookup is rebuilt from
        // component data.
        self.door_index.rebuild(&self.world);
        Ok(())
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::SECONDS_TO_OPEN;

    const TICK: f32 = 0.2;

    fn run_until_arrived(engine: &mut SimulationEngine, agent: Entity, max_ticks: u32) -> bool {
        for _ in 0..max_ticks {
            engine.update(TICK);
            if !engine.is_moving(agent) {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_engine_creation() {
        let engine = SimulationEngine::new();
        assert_eq!(engine.door_count(), 0);
        assert_eq!(engine.agent_count(), 0);
        assert_eq!(engine.sim_time, 0.0);
    }

    #[test]
    fn test_step_through_open_air() {
        let mut engine = SimulationEngine::new();
        let agent = engine.spawn_agent(GridCell::new(2, 2), NavMode::Floor);
        engine.request_move(agent, CellOffset::new(1, 0), Vec::new());
        assert!(!engine.is_waiting(agent));

        engine.update(TICK);
        assert_eq!(engine.agent_cell(agent), Some(GridCell::new(3, 2)));
        assert!(!engine.is_moving(agent));
    }

    #[test]
    fn test_center_cell_is_immediately_passable() {
        let mut engine = SimulationEngine::new();
        // Door base (6,5) spanning (5,5)-(7,5); the agent steps onto the
        // center cell from below-left via a tube (single height).
        let door = engine.spawn_door(GridCell::new(6, 5));
        engine.complete_construction(door);
        let agent = engine.spawn_agent(GridCell::new(5, 5), NavMode::Tube);

        engine.request_move(agent, CellOffset::new(1, 0), Vec::new());
        assert!(!engine.is_waiting(agent));
        engine.update(TICK);
        assert_eq!(engine.agent_cell(agent), Some(GridCell::new(6, 5)));
    }

    #[test]
    fn test_enter_right_waits_until_open_then_passes() {
        let mut engine = SimulationEngine::new();
        // Door base (5,5), right sub-cell (6,5); agent at (5,5) moving
        // right: EnterRight, held until the right half opens.
        let door = engine.spawn_door(GridCell::new(5, 5));
        engine.complete_construction(door);
        let agent = engine.spawn_agent(GridCell::new(5, 5), NavMode::Tube);

        engine.request_move(agent, CellOffset::new(1, 0), Vec::new());
        assert!(engine.is_waiting(agent));
        assert_eq!(engine.agent_cell(agent), Some(GridCell::new(5, 5)));

        let ticks_to_open = (SECONDS_TO_OPEN / TICK) as u32 + 2;
        assert!(run_until_arrived(&mut engine, agent, ticks_to_open * 2));
        assert_eq!(engine.agent_cell(agent), Some(GridCell::new(6, 5)));

        // The request was finished, so the door swings shut again.
        for _ in 0..ticks_to_open * 2 {
            engine.update(TICK);
        }
        let component = engine.world.get::<&AirlockDoor>(door).unwrap();
        assert!(!component.is_right_open());
    }

    #[test]
    fn test_unspawned_door_does_not_gate() {
        let mut engine = SimulationEngine::new();
        let _door = engine.spawn_door(GridCell::new(5, 5));
        // Construction never completes.
        let agent = engine.spawn_agent(GridCell::new(5, 5), NavMode::Tube);
        engine.request_move(agent, CellOffset::new(1, 0), Vec::new());
        assert!(!engine.is_waiting(agent));
    }

    #[test]
    fn test_demolition_mid_wait_releases_agent() {
        let mut engine = SimulationEngine::new();
        let door = engine.spawn_door(GridCell::new(5, 5));
        engine.complete_construction(door);
        // Drain the door so it can never open.
        engine
            .world
            .get::<&mut AirlockDoor>(door)
            .unwrap()
            .stored_energy = 0.0;

        let agent = engine.spawn_agent(GridCell::new(5, 5), NavMode::Tube);
        engine.request_move(agent, CellOffset::new(1, 0), Vec::new());
        for _ in 0..20 {
            engine.update(TICK);
        }
        assert!(engine.is_waiting(agent));

        engine.demolish_door(door);
        engine.update(TICK);
        assert_eq!(engine.agent_cell(agent), Some(GridCell::new(6, 5)));
        assert!(!engine.is_moving(agent));
    }

    #[test]
    fn test_cancel_mid_wait_cleans_up() {
        let mut engine = SimulationEngine::new();
        let door = engine.spawn_door(GridCell::new(5, 5));
        engine.complete_construction(door);
        let agent = engine.spawn_agent(GridCell::new(5, 5), NavMode::Tube);
        engine.request_move(agent, CellOffset::new(1, 0), Vec::new());
        assert!(engine.is_waiting(agent));

        engine.cancel_transition(agent);
        assert!(!engine.is_moving(agent));
        assert_eq!(engine.agent_cell(agent), Some(GridCell::new(5, 5)));
        assert!(!engine
            .world
            .get::<&AirlockDoor>(door)
            .unwrap()
            .right_requested());
    }

    #[test]
    fn test_despawn_agent_finishes_requests() {
        let mut engine = SimulationEngine::new();
        let door = engine.spawn_door(GridCell::new(5, 5));
        engine.complete_construction(door);
        let agent = engine.spawn_agent(GridCell::new(5, 5), NavMode::Tube);
        engine.request_move(agent, CellOffset::new(1, 0), Vec::new());

        engine.despawn_agent(agent);
        assert_eq!(engine.agent_count(), 0);
        assert!(!engine
            .world
            .get::<&AirlockDoor>(door)
            .unwrap()
            .right_requested());
    }
}
