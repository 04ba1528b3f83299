use cgmath::{InnerSpace, Point3, Vector3};

use crate::core::Axis;

use super::{Face, GridGeometry, VoxelGrid};

/// Handle to a face inside a [`VoxelGrid`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FaceRef {
    /// The axis the face is perpendicular to
    pub direction: Axis,
    /// Index of the face in its axis' face array
    pub index: Point3<i32>,
}

/// The segment where up to four voxels (and four faces) meet.
///
/// An edge at index `(x, y, z)` running along `X` spans from corner
/// `(x, y, z)` to corner `(x + 1, y, z)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    /// Index of the edge in its axis' edge array
    pub index: Point3<i32>,
    /// The axis the edge runs along
    pub direction: Axis,
    /// World-space midpoint of the edge
    pub center: Point3<f64>,
    /// Flat indices of the surrounding voxels, ordered `(-,-), (+,-), (-,+), (+,+)`
    /// over the two perpendicular axes
    pub voxels: [Option<usize>; 4],
    /// The faces that share this edge
    pub faces: [Option<FaceRef>; 4],
}

impl Edge {
    /// Creates the edge at `index` running along `direction`.
    pub fn new(index: Point3<i32>, direction: Axis, geometry: &GridGeometry) -> Self {
        let (b, c) = direction.others();
        let (step_b, step_c) = (b.unit(), c.unit());

        let voxels = [(-1, -1), (0, -1), (-1, 0), (0, 0)]
            .map(|(db, dc)| geometry.flat_index(index + step_b * db + step_c * dc));

        let face = |axis: Axis, index: Point3<i32>| {
            geometry
                .face_exists(axis, index)
                .then_some(FaceRef { direction: axis, index })
        };
        let faces = [
            face(b, index - step_c),
            face(b, index),
            face(c, index - step_b),
            face(c, index),
        ];

        let mut offset = Vector3::new(0.0, 0.0, 0.0);
        offset[direction.index()] = 0.5;

        Edge {
            index,
            direction,
            center: geometry.lattice_point(index, offset),
            voxels,
            faces,
        }
    }

    /// Normalized sum of the normals of the adjacent faces.
    ///
    /// Zero for edges with no skin faces around them.
    pub fn normal(&self, grid: &VoxelGrid) -> Vector3<f64> {
        let normal = self
            .faces
            .iter()
            .flatten()
            .filter_map(|face| grid.face(face))
            .fold(Vector3::new(0.0, 0.0, 0.0), |sum, face| sum + face.normal());

        if normal.magnitude2() > 0.0 {
            normal.normalize()
        } else {
            normal
        }
    }

    /// Adjacent faces that are part of the grid skin.
    pub fn climbable_faces<'a>(&self, grid: &'a VoxelGrid) -> Vec<&'a Face> {
        self.faces
            .iter()
            .flatten()
            .filter_map(|face| grid.face(face))
            .filter(|face| face.is_skin())
            .collect()
    }
}
