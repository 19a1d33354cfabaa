//! Navigation modes and the single-height profile.
//!
//! Which modes occupy a single cell of height is configuration, not
//! code: the profile is supplied by the host (or a manifest) and the
//! coordinator only queries it.

use serde::{Deserialize, Serialize};

/// How an agent is currently moving through the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavMode {
    /// Walking on the floor (two cells tall).
    Floor,
    /// Climbing a ladder.
    Ladder,
    /// Sliding along a pole.
    Pole,
    /// Riding a transit tube (one cell tall).
    Tube,
}

/// Configured set of navigation modes that occupy only one cell of
/// height. Agents in these modes skip the cell-above-target door check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavProfile {
    pub single_height: Vec<NavMode>,
}

impl Default for NavProfile {
    fn default() -> Self {
        Self {
            single_height: vec![NavMode::Tube],
        }
    }
}

impl NavProfile {
    pub fn is_single_height(&self, mode: NavMode) -> bool {
        self.single_height.contains(&mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_tube_only() {
        let profile = NavProfile::default();
        assert!(profile.is_single_height(NavMode::Tube));
        assert!(!profile.is_single_height(NavMode::Floor));
        assert!(!profile.is_single_height(NavMode::Ladder));
    }

    #[test]
    fn test_custom_profile() {
        let profile = NavProfile {
            single_height: vec![NavMode::Tube, NavMode::Pole],
        };
        assert!(profile.is_single_height(NavMode::Pole));
        assert!(!profile.is_single_height(NavMode::Floor));
    }
}
