use cgmath::{Point3, Vector3};

use crate::core::Axis;

use super::GridGeometry;

/// Where a face sits relative to the voxels of the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryType {
    /// Voxels on both sides.
    Inside,
    /// Only a voxel on the positive side; the face is on the grid's minimum boundary.
    Left,
    /// Only a voxel on the negative side; the face is on the grid's maximum boundary.
    Right,
    /// No voxel on either side.
    Outside,
}

/// The square between two voxels that are neighbours along `direction`.
///
/// A face at index `(x, y, z)` with direction `X` separates voxel
/// `(x - 1, y, z)` from voxel `(x, y, z)`; either may be missing at the
/// grid boundary. Voxels are referenced by their flat index in the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    /// Index of the face in its axis' face array
    pub index: Point3<i32>,
    /// The axis the face is perpendicular to
    pub direction: Axis,
    /// Flat indices of the voxels on the negative and positive side
    pub voxels: [Option<usize>; 2],
    /// World-space centre of the face
    pub center: Point3<f64>,
}

impl Face {
    /// Creates the face at `index` perpendicular to `direction`.
    ///
    /// # Arguments
    /// * `index` - Index of the face, in `[0, size]` along `direction` and `[0, size)` otherwise
    /// * `direction` - The axis the face is perpendicular to
    /// * `geometry` - Geometry of the grid the face belongs to
    pub fn new(index: Point3<i32>, direction: Axis, geometry: &GridGeometry) -> Self {
        let voxels = [
            geometry.flat_index(index - direction.unit()),
            geometry.flat_index(index),
        ];

        let mut offset = Vector3::new(0.5, 0.5, 0.5);
        offset[direction.index()] = 0.0;

        Face {
            index,
            direction,
            voxels,
            center: geometry.lattice_point(index, offset),
        }
    }

    /// Classifies the face by which of its two voxels exist.
    pub fn boundary(&self) -> BoundaryType {
        match (self.voxels[0].is_some(), self.voxels[1].is_some()) {
            (false, true) => BoundaryType::Left,
            (true, false) => BoundaryType::Right,
            (true, true) => BoundaryType::Inside,
            (false, false) => BoundaryType::Outside,
        }
    }

    /// Whether the face lies on the ground plane (`y == 0`, facing up).
    pub fn is_ground(&self) -> bool {
        self.direction == Axis::Y && self.index.y == 0
    }

    /// Outward normal of the grid skin at this face.
    ///
    /// Zero for faces that are not on the grid boundary.
    pub fn normal(&self) -> Vector3<f64> {
        match self.boundary() {
            BoundaryType::Left => -self.direction.unit_f64(),
            BoundaryType::Right => self.direction.unit_f64(),
            BoundaryType::Inside | BoundaryType::Outside => Vector3::new(0.0, 0.0, 0.0),
        }
    }

    /// Whether the face is part of the outer skin of the grid.
    ///
    /// Faces on the ground plane are not skin.
    pub fn is_skin(&self) -> bool {
        !self.is_ground() && matches!(self.boundary(), BoundaryType::Left | BoundaryType::Right)
    }
}
