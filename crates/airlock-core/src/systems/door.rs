//! Door system - drives per-side open state and the door lifecycle.
//!
//! This is the stand-in for the external animation/energy process: the
//! coordinator only ever queues requests and reads the derived open
//! flags; this system is what eventually flips them.

use crate::components::AirlockDoor;
use crate::grid_index::DoorIndex;
use airlock_logic::grid::GridCell;
use hecs::{Entity, World};

/// Advance every door's halves by `dt` seconds.
pub fn door_system(world: &mut World, dt: f32) {
    for (_, door) in world.query_mut::<&mut AirlockDoor>() {
        door.advance(dt);
    }
}

/// Place a door anchored at `base_cell` and claim its cells in the
/// index. The door starts under construction and gates nothing until
/// [`complete_construction`] runs.
pub fn spawn_door(world: &mut World, index: &mut DoorIndex, base_cell: GridCell) -> Entity {
    let door = AirlockDoor::new(base_cell);
    let cells = door.cells();
    let entity = world.spawn((door,));
    index.register(entity, &cells);
    log::debug!("door {:?} placed at {:?}", entity, base_cell);
    entity
}

/// Mark a door's construction finished so it starts gating traversal.
pub fn complete_construction(world: &mut World, door: Entity) {
    if let Ok(mut component) = world.get::<&mut AirlockDoor>(door) {
        component.spawned = true;
        log::debug!("door {:?} construction complete", door);
    }
}

/// Demolish a door: force-finish every outstanding request, mark it
/// unspawned, release its cells, and despawn it. Coordinators still
/// holding the door skip it on their next open-check.
pub fn demolish_door(world: &mut World, index: &mut DoorIndex, door: Entity) {
    let cells = {
        let Ok(mut component) = world.get::<&mut AirlockDoor>(door) else {
            return;
        };
        component.finish_all();
        component.spawned = false;
        component.cells()
    };
    index.unregister(&cells);
    let _ = world.despawn(door);
    log::debug!("door {:?} demolished", door);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::SECONDS_TO_OPEN;
    use airlock_logic::request::{DoorRequestKind, RequestState};

    #[test]
    fn test_spawn_then_complete_construction() {
        let mut world = World::new();
        let mut index = DoorIndex::new();
        let door = spawn_door(&mut world, &mut index, GridCell::new(6, 5));

        assert_eq!(index.spawned_door_at(&world, GridCell::new(6, 5)), None);
        complete_construction(&mut world, door);
        assert_eq!(
            index.spawned_door_at(&world, GridCell::new(6, 5)),
            Some(door)
        );
    }

    #[test]
    fn test_door_system_opens_requested_side() {
        let mut world = World::new();
        let mut index = DoorIndex::new();
        let door = spawn_door(&mut world, &mut index, GridCell::new(6, 5));
        complete_construction(&mut world, door);

        world
            .get::<&mut AirlockDoor>(door)
            .unwrap()
            .queue(DoorRequestKind::EnterRight);

        door_system(&mut world, SECONDS_TO_OPEN * 2.0);
        let component = world.get::<&AirlockDoor>(door).unwrap();
        assert!(component.is_right_open());
        assert!(!component.is_left_open());
    }

    #[test]
    fn test_demolish_finishes_requests_and_frees_cells() {
        let mut world = World::new();
        let mut index = DoorIndex::new();
        let door = spawn_door(&mut world, &mut index, GridCell::new(6, 5));
        complete_construction(&mut world, door);

        world
            .get::<&mut AirlockDoor>(door)
            .unwrap()
            .queue(DoorRequestKind::EnterLeft);

        // Observe the force-finish before the entity disappears.
        {
            let mut component = world.get::<&mut AirlockDoor>(door).unwrap();
            component.finish_all();
            assert_eq!(
                component.request_state(DoorRequestKind::EnterLeft),
                RequestState::Done
            );
        }

        demolish_door(&mut world, &mut index, door);
        assert_eq!(index.cell_count(), 0);
        assert!(world.get::<&AirlockDoor>(door).is_err());

        // Demolishing twice is harmless.
        demolish_door(&mut world, &mut index, door);
    }
}
