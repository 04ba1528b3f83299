//! # Voxels Module
//!
//! The discretized volume: single voxels, the dense grid that owns them and
//! the containment oracle used to carve the grid to an enclosing surface.
//!
//! ## Key Components
//! - `Voxel`: One cell with its occupancy state
//! - `VoxelGrid`: The dense grid plus its faces, edges and corners
//! - `BoundingMesh`: Parity-based point-in-solid test over closed meshes
//!
//! ## Architecture
//! The grid is the single owner of every voxel and every topology element.
//! Everything else (faces, edges, blocks, listeners) refers to voxels by flat
//! index. Occupancy is only mutated through crate-private methods on the
//! grid, which the placement layer drives.

pub mod bounding_mesh;
pub mod grid;
pub mod voxel;

// Re-export types for easier access
pub use bounding_mesh::{Aabb, BoundingMesh, ClosedMesh};
pub use grid::VoxelGrid;
pub use voxel::{Color, Voxel, VoxelState};
