//! # Axis Module
//!
//! The three grid axes and the small amount of vector bookkeeping that goes
//! with them. Faces and edges are oriented along an [`Axis`], and most of the
//! topology code is written once and parameterized by it.

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

/// One of the three principal axes of the voxel grid.
///
/// The discriminants double as component indices into `Vector3`/`Point3`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// The X axis
    X = 0,
    /// The Y axis (up)
    Y = 1,
    /// The Z axis (forward)
    Z = 2,
}

impl Axis {
    /// Returns all three axes in `X, Y, Z` order.
    pub fn all() -> [Axis; 3] {
        [Axis::X, Axis::Y, Axis::Z]
    }

    /// Unit step along this axis on the integer lattice.
    pub fn unit(self) -> Vector3<i32> {
        match self {
            Axis::X => Vector3::new(1, 0, 0),
            Axis::Y => Vector3::new(0, 1, 0),
            Axis::Z => Vector3::new(0, 0, 1),
        }
    }

    /// Unit vector along this axis in world space.
    pub fn unit_f64(self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::new(1.0, 0.0, 0.0),
            Axis::Y => Vector3::new(0.0, 1.0, 0.0),
            Axis::Z => Vector3::new(0.0, 0.0, 1.0),
        }
    }

    /// The two axes perpendicular to this one, in ascending order.
    pub fn others(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }

    /// Index of this axis into a vector or point.
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_others_are_perpendicular() {
        for axis in Axis::all() {
            let (b, c) = axis.others();
            assert_ne!(axis, b);
            assert_ne!(axis, c);
            assert!(b.index() < c.index());
        }
    }

    #[test]
    fn test_unit_matches_index() {
        for axis in Axis::all() {
            assert_eq!(axis.unit()[axis.index()], 1);
            assert_eq!(axis.unit_f64()[axis.index()], 1.0);
        }
    }
}
