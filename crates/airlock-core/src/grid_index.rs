//! Cell-to-door lookup over the simulation grid.
//!
//! The index maps every cell a door spans to the door's entity. It
//! answers "is there a door at cell X, and is it spawned" without
//! walking the whole world, and it is rebuilt from component data after
//! a load.

use crate::components::AirlockDoor;
use airlock_logic::grid::GridCell;
use hecs::{Entity, World};
use std::collections::HashMap;

/// Read-only door lookup keyed by grid cell.
#[derive(Debug, Default)]
pub struct DoorIndex {
    cells: HashMap<GridCell, Entity>,
}

impl DoorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a door entity under each cell it spans.
    pub fn register(&mut self, door: Entity, cells: &[GridCell]) {
        for &cell in cells {
            let _ = self.cells.insert(cell, door);
        }
    }

    /// Remove the given cells from the index.
    pub fn unregister(&mut self, cells: &[GridCell]) {
        for cell in cells {
            let _ = self.cells.remove(cell);
        }
    }

    /// The door occupying `cell`, spawned or not.
    pub fn door_at(&self, cell: GridCell) -> Option<Entity> {
        self.cells.get(&cell).copied()
    }

    /// The door occupying `cell`, only if it has finished construction
    /// and has not been demolished. Doors still being built never gate
    /// traversal.
    pub fn spawned_door_at(&self, world: &World, cell: GridCell) -> Option<Entity> {
        let entity = self.door_at(cell)?;
        match world.get::<&AirlockDoor>(entity) {
            Ok(door) if door.spawned => Some(entity),
            _ => None,
        }
    }

    /// Number of cells currently claimed by doors.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Drop all registrations and re-add every door in the world.
    pub fn rebuild(&mut self, world: &World) {
        self.cells.clear();
        for (entity, door) in world.query::<&AirlockDoor>().iter() {
            self.register(entity, &door.cells());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_door(spawned: bool) -> (World, DoorIndex, Entity) {
        let mut world = World::new();
        let mut door = AirlockDoor::new(GridCell::new(6, 5));
        door.spawned = spawned;
        let cells = door.cells();
        let entity = world.spawn((door,));
        let mut index = DoorIndex::new();
        index.register(entity, &cells);
        (world, index, entity)
    }

    #[test]
    fn test_door_found_on_every_spanned_cell() {
        let (_, index, entity) = world_with_door(true);
        for x in 5..=7 {
            assert_eq!(index.door_at(GridCell::new(x, 5)), Some(entity));
        }
        assert_eq!(index.door_at(GridCell::new(8, 5)), None);
        assert_eq!(index.door_at(GridCell::new(6, 6)), None);
    }

    #[test]
    fn test_unspawned_door_is_distinguished_from_no_door() {
        let (world, index, entity) = world_with_door(false);
        // The building exists...
        assert_eq!(index.door_at(GridCell::new(6, 5)), Some(entity));
        // ...but does not gate traversal yet.
        assert_eq!(index.spawned_door_at(&world, GridCell::new(6, 5)), None);
        // A cell with nothing at all also answers none.
        assert_eq!(index.spawned_door_at(&world, GridCell::new(0, 0)), None);
    }

    #[test]
    fn test_unregister_clears_cells() {
        let (_, mut index, _) = world_with_door(true);
        index.unregister(&[
            GridCell::new(5, 5),
            GridCell::new(6, 5),
            GridCell::new(7, 5),
        ]);
        assert_eq!(index.cell_count(), 0);
        assert_eq!(index.door_at(GridCell::new(6, 5)), None);
    }

    #[test]
    fn test_rebuild_matches_world() {
        let (world, mut index, entity) = world_with_door(true);
        index.unregister(&[GridCell::new(6, 5)]);
        index.rebuild(&world);
        assert_eq!(index.cell_count(), 3);
        assert_eq!(index.door_at(GridCell::new(6, 5)), Some(entity));
    }
}
