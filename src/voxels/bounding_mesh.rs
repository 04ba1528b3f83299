//! # Bounding Mesh Module
//!
//! The containment oracle. A [`BoundingMesh`] is a union of closed triangle
//! meshes; a point is inside it when, for at least one of the meshes, a ray
//! cast from the point crosses that mesh an odd number of times.
//!
//! ## Ray Casting
//!
//! The ray always points along +Z. Rather than intersecting every triangle
//! once, the cast repeatedly takes the nearest hit over all volumes, counts it
//! for the volume it belongs to and restarts just past the hit point. A ray
//! that grazes the seam between two triangles therefore counts one crossing,
//! not two.
//!
//! ## Preconditions
//!
//! Every mesh must be closed (manifold). Open meshes make the parity
//! meaningless; this is not detected at runtime.
//!
//! The oracle is only consulted while setting up a grid, once per voxel.

use cgmath::{InnerSpace, Point3, Vector3};

use crate::error::{FillerError, FillerResult};

/// Direction every containment ray is cast in.
pub const RAY_DIRECTION: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);

/// Distance a ray restarts past each hit.
pub const RAY_NUDGE: f64 = 0.00001;

/// Hits closer than this to the ray origin are ignored.
const HIT_EPSILON: f64 = 1e-10;

/// An axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Point3<f64>,
    /// Maximum corner
    pub max: Point3<f64>,
}

impl Aabb {
    /// Smallest box containing every point, or `None` for no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Aabb> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Aabb { min: first, max: first }, |bounds, point| {
            bounds.encapsulate(&Aabb {
                min: *point,
                max: *point,
            })
        }))
    }

    /// Smallest box containing both `self` and `other`.
    pub fn encapsulate(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }
}

/// A closed triangle mesh used as one boundary volume.
#[derive(Clone, Debug)]
pub struct ClosedMesh {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<[usize; 3]>,
    bounds: Aabb,
}

impl ClosedMesh {
    /// Creates a mesh from vertices and triangle vertex indices.
    ///
    /// # Errors
    /// Returns [`FillerError::InvalidVolume`] if there are no triangles or a
    /// triangle refers to a vertex that does not exist. Whether the mesh is
    /// actually closed is not checked.
    pub fn new(vertices: Vec<Point3<f64>>, triangles: Vec<[usize; 3]>) -> FillerResult<Self> {
        if triangles.is_empty() {
            return Err(FillerError::invalid_volume("mesh has no triangles"));
        }
        if let Some(index) = triangles
            .iter()
            .flatten()
            .copied()
            .find(|&index| index >= vertices.len())
        {
            return Err(FillerError::invalid_volume(format!(
                "triangle index {index} out of range for {} vertices",
                vertices.len()
            )));
        }
        let bounds = Aabb::from_points(&vertices)
            .ok_or_else(|| FillerError::invalid_volume("mesh has no vertices"))?;

        Ok(ClosedMesh {
            vertices,
            triangles,
            bounds,
        })
    }

    /// A closed axis-aligned box made of 12 triangles.
    ///
    /// # Errors
    /// Returns [`FillerError::InvalidVolume`] if `max` is not strictly greater
    /// than `min` on every axis.
    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> FillerResult<Self> {
        if !(max.x > min.x && max.y > min.y && max.z > min.z) {
            return Err(FillerError::invalid_volume(format!(
                "cuboid max {max:?} must exceed min {min:?}"
            )));
        }

        let vertices = (0..8)
            .map(|corner| {
                Point3::new(
                    if corner & 1 == 0 { min.x } else { max.x },
                    if corner & 2 == 0 { min.y } else { max.y },
                    if corner & 4 == 0 { min.z } else { max.z },
                )
            })
            .collect();

        #[rustfmt::skip]
        let triangles = vec![
            [0, 2, 1], [1, 2, 3], // -Z
            [4, 5, 6], [5, 7, 6], // +Z
            [0, 1, 4], [1, 5, 4], // -Y
            [2, 6, 3], [3, 6, 7], // +Y
            [0, 4, 2], [2, 4, 6], // -X
            [1, 3, 5], [3, 7, 5], // +X
        ];

        ClosedMesh::new(vertices, triangles)
    }

    /// Bounds of the mesh.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Nearest intersection of the ray with this mesh, as a distance along the ray.
    fn nearest_hit(&self, origin: Point3<f64>, direction: Vector3<f64>) -> Option<f64> {
        self.triangles
            .iter()
            .filter_map(|&[a, b, c]| {
                ray_triangle_intersect(
                    origin,
                    direction,
                    self.vertices[a],
                    self.vertices[b],
                    self.vertices[c],
                )
            })
            .min_by(|a, b| a.total_cmp(b))
    }
}

/// Möller–Trumbore ray/triangle intersection. Back faces count as hits.
///
/// # Returns
/// `Some(t)` for a hit at `origin + t * direction` with `t > 0`, `None` otherwise.
pub fn ray_triangle_intersect(
    origin: Point3<f64>,
    direction: Vector3<f64>,
    v0: Point3<f64>,
    v1: Point3<f64>,
    v2: Point3<f64>,
) -> Option<f64> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < HIT_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > HIT_EPSILON).then_some(t)
}

/// The enclosing surface of the volume to fill, as a union of closed meshes.
#[derive(Clone, Debug)]
pub struct BoundingMesh {
    volumes: Vec<ClosedMesh>,
    bounds: Aabb,
}

impl BoundingMesh {
    /// Creates a bounding mesh from one or more closed volumes.
    ///
    /// # Errors
    /// Returns [`FillerError::InvalidVolume`] when `volumes` is empty.
    pub fn new(volumes: Vec<ClosedMesh>) -> FillerResult<Self> {
        let bounds = volumes
            .iter()
            .map(ClosedMesh::bounds)
            .reduce(|a, b| a.encapsulate(&b))
            .ok_or_else(|| FillerError::invalid_volume("no bounding volumes given"))?;

        Ok(BoundingMesh { volumes, bounds })
    }

    /// Union of the bounds of every volume.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// The volumes making up this bounding mesh.
    pub fn volumes(&self) -> &[ClosedMesh] {
        &self.volumes
    }

    /// Grid dimensions that cover the bounds, padded by `voxel_offset` voxels on each side.
    ///
    /// # Errors
    /// Returns [`FillerError::InvalidGrid`] when a dimension does not fit in an `i32`.
    pub fn grid_dimensions(&self, voxel_offset: i32, voxel_size: f64) -> FillerResult<Vector3<i32>> {
        let too_large = || {
            FillerError::invalid_grid(format!(
                "bounds {:?} at voxel size {voxel_size} with offset {voxel_offset} give too many voxels",
                self.bounds.size()
            ))
        };
        let padding = voxel_offset.checked_mul(2).ok_or_else(too_large)?;

        let cells = |extent: f64| -> FillerResult<i32> {
            // Absorbs float noise such as 2.0 / 0.2 = 10.000000000000002.
            let cells = ((extent / voxel_size) - 1e-9).ceil().max(0.0);
            if !(cells <= i32::MAX as f64) {
                return Err(too_large());
            }
            (cells as i32).checked_add(padding).ok_or_else(too_large)
        };

        let size = self.bounds.size();
        Ok(Vector3::new(cells(size.x)?, cells(size.y)?, cells(size.z)?))
    }

    /// World position of the minimum grid corner for the same padding.
    pub fn origin(&self, voxel_offset: i32, voxel_size: f64) -> Point3<f64> {
        self.bounds.min - Vector3::new(1.0, 1.0, 1.0) * (voxel_offset as f64 * voxel_size)
    }

    /// Parity test: whether `point` lies inside any of the volumes.
    pub fn is_inside(&self, point: Point3<f64>) -> bool {
        let mut hits = vec![0usize; self.volumes.len()];
        let mut origin = point;

        while let Some((volume, t)) = self.nearest_hit(origin) {
            hits[volume] += 1;
            origin += RAY_DIRECTION * (t + RAY_NUDGE);
        }

        hits.iter().any(|count| count % 2 != 0)
    }

    fn nearest_hit(&self, origin: Point3<f64>) -> Option<(usize, f64)> {
        self.volumes
            .iter()
            .enumerate()
            .filter_map(|(volume, mesh)| mesh.nearest_hit(origin, RAY_DIRECTION).map(|t| (volume, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn unit_box() -> ClosedMesh {
        ClosedMesh::cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn test_point_inside_box() {
        let mesh = BoundingMesh::new(vec![unit_box()]).unwrap();
        assert!(mesh.is_inside(Point3::new(0.5, 0.5, 0.5)));
        assert!(mesh.is_inside(Point3::new(0.1, 0.9, 0.3)));
    }

    #[test]
    fn test_point_outside_box() {
        let mesh = BoundingMesh::new(vec![unit_box()]).unwrap();
        assert!(!mesh.is_inside(Point3::new(1.5, 0.5, 0.5)));
        // Below the box, the ray passes through it twice.
        assert!(!mesh.is_inside(Point3::new(0.5, 0.5, -1.0)));
        assert!(!mesh.is_inside(Point3::new(0.5, 0.5, 2.0)));
    }

    #[test]
    fn test_ray_through_triangle_seam_counts_once() {
        let mesh = BoundingMesh::new(vec![unit_box()]).unwrap();
        // Both Z faces are split along x + y == 1.
        assert!(mesh.is_inside(Point3::new(0.5, 0.5, 0.25)));
        assert!(mesh.is_inside(Point3::new(0.75, 0.25, 0.75)));
        assert!(!mesh.is_inside(Point3::new(0.25, 0.75, -0.5)));
    }

    #[test]
    fn test_union_of_volumes() {
        let second =
            ClosedMesh::cuboid(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0)).unwrap();
        let mesh = BoundingMesh::new(vec![unit_box(), second]).unwrap();
        assert!(mesh.is_inside(Point3::new(0.5, 0.5, 0.5)));
        assert!(mesh.is_inside(Point3::new(2.5, 0.5, 0.5)));
        assert!(!mesh.is_inside(Point3::new(1.5, 0.5, 0.5)));
        assert_eq!(mesh.bounds().max, Point3::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn test_overlapping_volumes_still_inside() {
        let inner =
            ClosedMesh::cuboid(Point3::new(0.25, 0.25, 0.25), Point3::new(0.75, 0.75, 0.75))
                .unwrap();
        let mesh = BoundingMesh::new(vec![unit_box(), inner]).unwrap();
        assert!(mesh.is_inside(Point3::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_grid_dimensions_and_origin() {
        let volume =
            ClosedMesh::cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 1.0)).unwrap();
        let mesh = BoundingMesh::new(vec![volume]).unwrap();

        assert_eq!(mesh.grid_dimensions(0, 0.2).unwrap(), Vector3::new(10, 20, 5));
        assert_eq!(mesh.grid_dimensions(2, 0.2).unwrap(), Vector3::new(14, 24, 9));

        let origin = mesh.origin(2, 0.2);
        assert_relative_eq!(origin.x, -0.4, epsilon = 1e-12);
        assert_relative_eq!(origin.z, -0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_grid_dimensions_overflow() {
        let mesh = BoundingMesh::new(vec![unit_box()]).unwrap();
        assert!(mesh.grid_dimensions(i32::MAX, 0.2).is_err());
        assert!(mesh.grid_dimensions(i32::MAX / 2, 0.5).is_err());
        assert!(mesh.grid_dimensions(0, 1e-12).is_err());
        assert_eq!(mesh.grid_dimensions(0, 0.001).unwrap(), Vector3::new(1000, 1000, 1000));
    }

    #[test]
    fn test_invalid_meshes() {
        assert!(BoundingMesh::new(Vec::new()).is_err());
        assert!(ClosedMesh::new(vec![Point3::new(0.0, 0.0, 0.0)], vec![[0, 1, 2]]).is_err());
        assert!(ClosedMesh::new(Vec::new(), Vec::new()).is_err());
        assert!(ClosedMesh::cuboid(Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 1.0)).is_err());
    }

    #[test]
    fn test_ray_triangle_parallel_miss() {
        let hit = ray_triangle_intersect(
            Point3::new(0.0, 0.0, 0.0),
            RAY_DIRECTION,
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 2.0),
        );
        assert!(hit.is_none());
    }
}
