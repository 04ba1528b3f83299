//! # Placement Module
//!
//! Everything between a shape template and occupied voxels.
//!
//! ## Key Components
//! - `PatternLibrary`: Immutable registry of shape templates
//! - `Block`: One oriented, anchored instance of a pattern
//! - `BuildingManager`: Owns the grid, proposes, commits and purges blocks
//! - `VoxelListener`: Fire-and-forget sink for occupancy changes
//!
//! ## Usage
//! ```rust
//! use cgmath::{Point3, Vector3};
//! use voxel_filler::placement::{default_library, BlockState, BuildingManager, PatternType};
//! use voxel_filler::core::Rotation;
//! use voxel_filler::voxels::VoxelGrid;
//!
//! let grid = VoxelGrid::new(Vector3::new(4, 6, 4), 1.0, Point3::new(0.0, 0.0, 0.0)).unwrap();
//! let mut manager = BuildingManager::new(grid, default_library()).unwrap();
//!
//! let state = manager
//!     .propose(Point3::new(0, 0, 0), Rotation::IDENTITY, PatternType::PatternB)
//!     .unwrap();
//! assert_eq!(state, BlockState::Valid);
//! assert!(manager.commit_pending());
//! assert_eq!(manager.number_of_blocks(), 1);
//! ```

pub mod block;
pub mod building_manager;
pub mod listener;
pub mod pattern;

// Re-export types for easier access
pub use block::{Block, BlockState};
pub use building_manager::BuildingManager;
pub use listener::{LogListener, VoxelListener};
pub use pattern::{default_library, Pattern, PatternLibrary, PatternType, PATTERN_LIBRARY};
