//! Movement system - completes advancing transitions.

use crate::components::{ActiveTransition, Navigator, TransitionState};
use crate::systems::end_transition;
use airlock_logic::grid::CellOffset;
use hecs::{Entity, World};

/// Apply every transition that is free to advance: the agent steps to
/// its target cell, the transition ends, and the door mapping is
/// cleared with matching finishes.
pub fn movement_system(world: &mut World) {
    // Collect first - can't mutate while iterating.
    let mut completed: Vec<(Entity, CellOffset)> = Vec::new();
    for (entity, (_nav, transition)) in world.query::<(&Navigator, &ActiveTransition)>().iter() {
        if transition.state == TransitionState::Advancing {
            completed.push((entity, transition.offset));
        }
    }

    for (entity, offset) in completed {
        if let Ok(mut nav) = world.get::<&mut Navigator>(entity) {
            nav.cell = nav.cell.offset(offset);
        }
        end_transition(world, entity);
        let _ = world.remove_one::<ActiveTransition>(entity);
        log::debug!("agent {:?} advanced by {:?}", entity, offset);
    }
}
