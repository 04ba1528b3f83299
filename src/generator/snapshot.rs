//! Serializable view of a filled grid and the ledger that produced it.

use serde::{Deserialize, Serialize};

use crate::placement::BuildingManager;
use crate::voxels::voxel::{Color, VoxelState};

use super::ledger::{LedgerEntry, SeedLedger};

/// One voxel in a [`GridSnapshot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoxelRecord {
    /// Grid index
    pub index: [i32; 3],
    /// World-space centre
    pub centre: [f64; 3],
    /// Occupancy
    pub state: VoxelState,
    /// Colour of the occupying block
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color: Option<Color>,
}

/// The state of a fill, for a presentation layer or for storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Grid dimensions
    pub size: [i32; 3],
    /// Edge length of a voxel
    pub voxel_size: f64,
    /// Minimum corner of the grid
    pub origin: [f64; 3],
    /// Seed that produced the fill, if it came from the search
    pub seed: Option<u64>,
    /// Percentage of all voxels filled
    pub efficiency: f64,
    /// Percentage of non-dead voxels filled
    pub usable_efficiency: f64,
    /// Number of placed blocks
    pub number_of_blocks: usize,
    /// Ranked seeds, best first
    pub ledger: Vec<LedgerEntry>,
    /// Every voxel in x-major order
    pub voxels: Vec<VoxelRecord>,
}

impl GridSnapshot {
    /// Captures the grid held by `manager`.
    pub fn capture(manager: &BuildingManager, seed: Option<u64>, ledger: &SeedLedger) -> Self {
        let grid = manager.grid();
        let size = grid.size();
        let origin = grid.origin();

        let voxels = grid
            .flattened_voxels()
            .map(|voxel| VoxelRecord {
                index: voxel.index.into(),
                centre: voxel.centre.into(),
                state: voxel.state(),
                color: voxel.color(),
            })
            .collect();

        GridSnapshot {
            size: size.into(),
            voxel_size: grid.voxel_size(),
            origin: origin.into(),
            seed,
            efficiency: manager.efficiency(),
            usable_efficiency: manager.usable_efficiency(),
            number_of_blocks: manager.number_of_blocks(),
            ledger: ledger.entries().to_vec(),
            voxels,
        }
    }

    /// Number of voxels in `state`.
    pub fn count(&self, state: VoxelState) -> usize {
        self.voxels.iter().filter(|voxel| voxel.state == state).count()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Point3, Vector3};

    use super::*;
    use crate::core::Rotation;
    use crate::placement::{default_library, PatternType};
    use crate::voxels::grid::VoxelGrid;

    #[test]
    fn test_capture_to_json() {
        let grid = VoxelGrid::new(Vector3::new(2, 5, 2), 0.5, Point3::new(-1.0, 0.0, 0.0)).unwrap();
        let mut manager = BuildingManager::new(grid, default_library()).unwrap();
        manager
            .propose(Point3::new(1, 0, 1), Rotation::IDENTITY, PatternType::PatternB)
            .unwrap();
        assert!(manager.commit_pending());

        let mut ledger = SeedLedger::new(2);
        ledger.record(7, manager.efficiency());

        let snapshot = GridSnapshot::capture(&manager, Some(7), &ledger);
        assert_eq!(snapshot.size, [2, 5, 2]);
        assert_eq!(snapshot.voxels.len(), 20);
        assert_eq!(snapshot.count(VoxelState::Alive), 5);
        assert_eq!(snapshot.efficiency, 25.0);
        assert_eq!(snapshot.voxels[1].index, [0, 0, 1]);
        assert_eq!(snapshot.voxels[0].centre, [-0.75, 0.25, 0.25]);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"Alive\""));
        let parsed: GridSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ledger, snapshot.ledger);
        assert_eq!(parsed.count(VoxelState::Alive), 5);
    }
}
