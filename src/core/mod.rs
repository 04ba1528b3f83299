//! # Core Module
//!
//! Pure geometric utilities shared by the grid, the placement layer and the
//! generator. Nothing in here owns grid state.
//!
//! ## Key Components
//! - `Axis`: The three grid axes
//! - `GridArray`: Dense x-major 3D storage used for cells and topology
//! - `Rotation`: One of the 24 lattice-preserving rotations
//! - `orient_index`: Maps a local pattern offset into the world grid
//!
//! ## Usage
//! ```rust
//! use cgmath::{Point3, Vector3};
//! use voxel_filler::core::{orient_index, Rotation};
//!
//! let size = Vector3::new(4, 4, 4);
//! let world = orient_index(Vector3::new(1, 0, 0), Point3::new(0, 0, 0), Rotation::IDENTITY, size);
//! assert_eq!(world, Some(Point3::new(1, 0, 0)));
//! ```

pub mod axis;
pub mod grid_array;
pub mod orientation;

// Re-export types for easier access
pub use axis::Axis;
pub use grid_array::GridArray;
pub use orientation::{check_bounds, orient_index, round_to_lattice, Rotation, ROTATION_COUNT};
