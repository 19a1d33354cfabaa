//! Integer cell coordinates and offsets on the simulation grid.
//!
//! Cells are addressed by signed column/row so that relative offsets
//! (door side, navigation direction) fall out of plain subtraction.

use serde::{Deserialize, Serialize};

/// A single cell on the simulation grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell displaced by the given offset.
    pub fn offset(self, delta: CellOffset) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }

    /// The cell directly above this one.
    pub fn above(self) -> Self {
        Self {
            x: self.x,
            y: self.y + 1,
        }
    }

    /// Offset of `other` relative to this cell.
    pub fn offset_to(self, other: GridCell) -> CellOffset {
        CellOffset {
            x: other.x - self.x,
            y: other.y - self.y,
        }
    }
}

/// A relative displacement between two cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellOffset {
    pub x: i32,
    pub y: i32,
}

impl CellOffset {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for CellOffset {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Neg for CellOffset {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}
