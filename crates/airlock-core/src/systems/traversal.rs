//! Traversal coordinator - decides which door requests a movement
//! needs, queues them, and gates the agent until the doors open.
//!
//! The host calls [`begin_transition`] and [`end_transition`] at
//! transition boundaries and [`clear_door_requests`] when an agent is
//! torn down; [`traversal_system`] re-evaluates held transitions once
//! per tick. Every exit path finishes each mapped request exactly once.

use crate::components::{ActiveTransition, AirlockDoor, Navigator, PendingDoors, TransitionState};
use crate::grid_index::DoorIndex;
use airlock_logic::grid::GridCell;
use airlock_logic::nav::NavProfile;
use airlock_logic::request::classify;
use hecs::{Entity, World};

/// Start a transition attempt for `agent`.
///
/// Clears any leftover mapping from a prior transition first (a
/// re-entrant begin must never leak requests), inspects the target
/// cell, the cell above it (skipped for single-height modes), and the
/// configured void-offset cells, queues one request per new door found,
/// and holds the transition in [`TransitionState::Waiting`] if any
/// mapped door is not yet open.
pub fn begin_transition(
    world: &mut World,
    index: &DoorIndex,
    profile: &NavProfile,
    agent: Entity,
) {
    clear_door_requests(world, agent);

    let Some((agent_cell, mode)) = world
        .get::<&Navigator>(agent)
        .ok()
        .map(|nav| (nav.cell, nav.mode))
    else {
        return;
    };
    let Some((offset, void_offsets)) = world
        .get::<&ActiveTransition>(agent)
        .ok()
        .map(|transition| (transition.offset, transition.void_offsets.clone()))
    else {
        return;
    };

    let target = agent_cell.offset(offset);
    let mut inspected = Vec::with_capacity(2 + void_offsets.len());
    inspected.push(target);
    if !profile.is_single_height(mode) {
        inspected.push(target.above());
    }
    for void_offset in void_offsets {
        inspected.push(agent_cell.offset(void_offset));
    }

    for cell in inspected {
        request_open_door(world, index, agent, agent_cell, cell);
    }

    let gated = world
        .get::<&PendingDoors>(agent)
        .map(|pending| !pending.is_empty() && !all_doors_open(world, &*pending))
        .unwrap_or(false);
    if gated {
        if let Ok(mut transition) = world.get::<&mut ActiveTransition>(agent) {
            transition.state = TransitionState::Waiting;
        }
        log::debug!("agent {:?} waiting on doors at {:?}", agent, target);
    }
}

/// Queue a request on the door at `cell`, if one is there and not
/// already mapped for this transition.
fn request_open_door(
    world: &mut World,
    index: &DoorIndex,
    agent: Entity,
    agent_cell: GridCell,
    cell: GridCell,
) {
    let Some(door_entity) = index.spawned_door_at(world, cell) else {
        return;
    };

    let door_dx = {
        let Ok(door) = world.get::<&AirlockDoor>(door_entity) else {
            return;
        };
        cell.x - door.base_cell.x
    };
    let nav_dx = cell.x - agent_cell.x;
    let Some(kind) = classify(door_dx, nav_dx) else {
        // Center cell, always passable.
        return;
    };

    let inserted = match world.get::<&mut PendingDoors>(agent) {
        Ok(mut pending) => pending.insert(door_entity, kind),
        Err(_) => false,
    };
    if inserted {
        if let Ok(mut door) = world.get::<&mut AirlockDoor>(door_entity) {
            door.queue(kind);
        }
        log::debug!(
            "agent {:?} queued {:?} on door {:?}",
            agent,
            kind,
            door_entity
        );
    }
}

/// The resumption predicate: every mapped door's relevant side is open.
///
/// A door that has vanished or lost its spawned state is vacuously
/// satisfied - an agent must never be stuck waiting on a door that no
/// longer exists.
pub fn all_doors_open(world: &World, pending: &PendingDoors) -> bool {
    for (door_entity, kind) in pending.iter() {
        match world.get::<&AirlockDoor>(door_entity) {
            Ok(door) if door.spawned => {
                if !door.is_open_for(kind) {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

/// Re-evaluate every held transition, releasing agents whose doors have
/// all opened since the last tick.
pub fn traversal_system(world: &mut World) {
    let mut released: Vec<Entity> = Vec::new();
    for (entity, (transition, pending)) in world.query::<(&ActiveTransition, &PendingDoors)>().iter()
    {
        if transition.state == TransitionState::Waiting && all_doors_open(world, pending) {
            released.push(entity);
        }
    }
    for entity in released {
        if let Ok(mut transition) = world.get::<&mut ActiveTransition>(entity) {
            transition.state = TransitionState::Advancing;
        }
        log::debug!("agent {:?} released, doors open", entity);
    }
}

/// Close out a completed transition, finishing every mapped request.
pub fn end_transition(world: &mut World, agent: Entity) {
    clear_door_requests(world, agent);
}

/// Empty the agent's door mapping, finishing each request exactly once.
///
/// Called on normal completion, cancellation, and agent teardown; safe
/// when the mapping is already empty or a mapped door has despawned.
pub fn clear_door_requests(world: &mut World, agent: Entity) {
    let entries = match world.get::<&mut PendingDoors>(agent) {
        Ok(mut pending) => pending.drain(),
        Err(_) => return,
    };
    for (door_entity, kind) in entries {
        if let Ok(mut door) = world.get::<&mut AirlockDoor>(door_entity) {
            door.finish(kind);
            log::trace!(
                "agent {:?} finished {:?} on door {:?}",
                agent,
                kind,
                door_entity
            );
        }
    }
}
