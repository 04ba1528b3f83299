use cgmath::{Point3, Vector3};

use super::GridGeometry;

/// A lattice point where up to eight voxels meet.
#[derive(Clone, Debug, PartialEq)]
pub struct Corner {
    /// Index of the corner, in `[0, size]` per axis
    pub index: Point3<i32>,
    /// World-space position
    pub position: Point3<f64>,
}

impl Corner {
    /// Creates the corner at `index`.
    pub fn new(index: Point3<i32>, geometry: &GridGeometry) -> Self {
        Corner {
            index,
            position: geometry.lattice_point(index, Vector3::new(0.0, 0.0, 0.0)),
        }
    }

    /// Flat indices of the voxels touching this corner.
    pub fn connected_voxels(&self, geometry: &GridGeometry) -> Vec<usize> {
        let mut voxels = Vec::with_capacity(8);
        for dz in -1..=0 {
            for dy in -1..=0 {
                for dx in -1..=0 {
                    if let Some(flat) = geometry.flat_index(self.index + Vector3::new(dx, dy, dz)) {
                        voxels.push(flat);
                    }
                }
            }
        }
        voxels
    }
}
