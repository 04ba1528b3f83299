//! # Voxel Grid Module
//!
//! The dense voxel grid and the topology derived from it.
//!
//! ## Layout
//!
//! Every array in the grid is a [`GridArray`] stored in x-major order, so
//! iterating the voxels always yields `(0,0,0), (0,0,1), ..., (0,1,0), ...`.
//! Anything that consumes voxels in order (for example "first available
//! voxel" tie-breaks) is reproducible.
//!
//! | Element | Array size | Count |
//! |---|---|---|
//! | Voxels | `size` | 1 |
//! | Faces | `size + axis` | 3 (one per axis) |
//! | Edges | `size + (1,1,1) - axis` | 3 (one per axis) |
//! | Corners | `size + (1,1,1)` | 1 |
//!
//! ## Ownership
//!
//! The grid owns every voxel, face, edge and corner. Topology elements and
//! blocks refer to voxels by flat index only, never by a second owning
//! handle. Faces, edges and corners are built once in [`VoxelGrid::new`] and
//! never change; only voxel occupancy does.

use cgmath::{Point3, Vector3};
use log::{debug, info};

use crate::core::{check_bounds, grid_array, Axis, GridArray};
use crate::error::{FillerError, FillerResult};

use super::bounding_mesh::BoundingMesh;
use super::voxel::{Color, Voxel, VoxelState};

mod corner;
mod edge;
mod face;

pub use corner::Corner;
pub use edge::{Edge, FaceRef};
pub use face::{BoundaryType, Face};

/// Largest number of elements any array of a grid may hold; indices stay
/// addressable as `i32` lattice coordinates.
pub const MAX_GRID_ELEMENTS: usize = i32::MAX as usize;

/// Size, scale and placement of a grid in world space.
///
/// This is the non-owning view of a grid that its topology elements are built
/// against.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridGeometry {
    /// Number of voxels along each axis
    pub size: Vector3<i32>,
    /// Edge length of one voxel
    pub voxel_size: f64,
    /// World position of the minimum corner of the grid
    pub origin: Point3<f64>,
}

impl GridGeometry {
    /// Flat index of the voxel at `index`, or `None` when outside the grid.
    pub fn flat_index(&self, index: Point3<i32>) -> Option<usize> {
        grid_array::flat_index(index, self.size)
    }

    /// World position of lattice point `index` shifted by `offset` voxels.
    pub fn lattice_point(&self, index: Point3<i32>, offset: Vector3<f64>) -> Point3<f64> {
        let index = Vector3::new(index.x as f64, index.y as f64, index.z as f64);
        self.origin + (index + offset) * self.voxel_size
    }

    /// World-space centre of the voxel at `index`.
    pub fn voxel_centre(&self, index: Point3<i32>) -> Point3<f64> {
        self.lattice_point(index, Vector3::new(0.5, 0.5, 0.5))
    }

    /// Size of the face array perpendicular to `axis`.
    pub fn face_array_size(&self, axis: Axis) -> Vector3<i32> {
        self.size + axis.unit()
    }

    /// Size of the edge array running along `axis`.
    pub fn edge_array_size(&self, axis: Axis) -> Vector3<i32> {
        self.size + Vector3::new(1, 1, 1) - axis.unit()
    }

    /// Size of the corner array.
    pub fn corner_array_size(&self) -> Vector3<i32> {
        self.size + Vector3::new(1, 1, 1)
    }

    /// Whether a face with this index exists perpendicular to `axis`.
    pub fn face_exists(&self, axis: Axis, index: Point3<i32>) -> bool {
        check_bounds(index, self.face_array_size(axis))
    }
}

/// A dense 3D grid of voxels with derived faces, edges and corners.
///
/// # Examples
///
/// ```
/// use cgmath::{Point3, Vector3};
/// use voxel_filler::voxels::grid::VoxelGrid;
///
/// let grid = VoxelGrid::new(Vector3::new(4, 4, 4), 1.0, Point3::new(0.0, 0.0, 0.0)).unwrap();
/// assert_eq!(grid.len(), 64);
/// assert_eq!(grid.efficiency(), 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    geometry: GridGeometry,
    voxels: GridArray<Voxel>,
    faces: [GridArray<Face>; 3],
    edges: [GridArray<Edge>; 3],
    corners: GridArray<Corner>,
}

impl VoxelGrid {
    /// Builds a grid with every voxel `Available`.
    ///
    /// # Arguments
    /// * `size` - Number of voxels along each axis; every component must be positive
    /// * `voxel_size` - Edge length of one voxel; must be positive and finite
    /// * `origin` - World position of the grid's minimum corner
    ///
    /// # Errors
    /// Returns [`FillerError::InvalidGrid`] for non-positive sizes, or when the
    /// grid would exceed [`MAX_GRID_ELEMENTS`].
    pub fn new(size: Vector3<i32>, voxel_size: f64, origin: Point3<f64>) -> FillerResult<Self> {
        if size.x <= 0 || size.y <= 0 || size.z <= 0 {
            return Err(FillerError::invalid_grid(format!(
                "dimensions must be positive, got {size:?}"
            )));
        }
        if !(voxel_size.is_finite() && voxel_size > 0.0) {
            return Err(FillerError::invalid_grid(format!(
                "voxel size must be positive, got {voxel_size}"
            )));
        }

        // The corner array is the largest one the grid allocates.
        let corners = [size.x, size.y, size.z]
            .iter()
            .try_fold(1usize, |count, &extent| count.checked_mul(extent as usize + 1))
            .filter(|&count| count <= MAX_GRID_ELEMENTS);
        if corners.is_none() {
            return Err(FillerError::invalid_grid(format!(
                "dimensions {size:?} exceed {MAX_GRID_ELEMENTS} elements per array"
            )));
        }

        let geometry = GridGeometry {
            size,
            voxel_size,
            origin,
        };

        let voxels = GridArray::from_fn(size, |index| Voxel::new(index, geometry.voxel_centre(index)));
        let faces = Axis::all().map(|axis| {
            GridArray::from_fn(geometry.face_array_size(axis), |index| {
                Face::new(index, axis, &geometry)
            })
        });
        let edges = Axis::all().map(|axis| {
            GridArray::from_fn(geometry.edge_array_size(axis), |index| {
                Edge::new(index, axis, &geometry)
            })
        });
        let corners =
            GridArray::from_fn(geometry.corner_array_size(), |index| Corner::new(index, &geometry));

        debug!(
            "Built grid {:?}: {} voxels, {} faces, {} edges, {} corners",
            size,
            voxels.len(),
            faces.iter().map(GridArray::len).sum::<usize>(),
            edges.iter().map(GridArray::len).sum::<usize>(),
            corners.len()
        );

        Ok(VoxelGrid {
            geometry,
            voxels,
            faces,
            edges,
            corners,
        })
    }

    /// Builds a grid that covers a bounding mesh and disables every voxel outside it.
    ///
    /// # Arguments
    /// * `mesh` - The enclosing surface
    /// * `voxel_offset` - Number of padding voxels added around the mesh bounds on each side
    /// * `voxel_size` - Edge length of one voxel
    pub fn from_bounding_mesh(
        mesh: &BoundingMesh,
        voxel_offset: i32,
        voxel_size: f64,
    ) -> FillerResult<Self> {
        let size = mesh.grid_dimensions(voxel_offset, voxel_size)?;
        let origin = mesh.origin(voxel_offset, voxel_size);
        let mut grid = VoxelGrid::new(size, voxel_size, origin)?;

        let disabled = grid.disable_outside_bounding_mesh(mesh);
        info!(
            "Grid {:?} at {:?}: {} of {} voxels outside the bounding mesh",
            size,
            origin,
            disabled,
            grid.len()
        );

        Ok(grid)
    }

    /// The grid's size, scale and origin.
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Number of voxels along each axis.
    pub fn size(&self) -> Vector3<i32> {
        self.geometry.size
    }

    /// Edge length of one voxel.
    pub fn voxel_size(&self) -> f64 {
        self.geometry.voxel_size
    }

    /// World position of the minimum corner.
    pub fn origin(&self) -> Point3<f64> {
        self.geometry.origin
    }

    /// Total number of voxels.
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Always `false`; a grid has at least one voxel.
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Flat index of `index`, if it is inside the grid.
    pub fn flat_index(&self, index: Point3<i32>) -> Option<usize> {
        self.voxels.flat_index(index)
    }

    /// Voxel at `index`, if it is inside the grid.
    pub fn voxel(&self, index: Point3<i32>) -> Option<&Voxel> {
        self.voxels.get(index)
    }

    /// Voxel at a flat index.
    ///
    /// # Panics
    /// Panics if `flat` is not below [`len`](Self::len).
    pub fn voxel_at(&self, flat: usize) -> &Voxel {
        self.voxels.at(flat)
    }

    /// World-space centre of the voxel at `index`, whether or not it is inside the grid.
    pub fn voxel_centre(&self, index: Point3<i32>) -> Point3<f64> {
        self.geometry.voxel_centre(index)
    }

    /// All voxels in x-major order.
    pub fn flattened_voxels(&self) -> impl Iterator<Item = &Voxel> + '_ {
        self.voxels.iter()
    }

    /// Number of voxels in `state`.
    pub fn count(&self, state: VoxelState) -> usize {
        self.voxels.iter().filter(|voxel| voxel.state() == state).count()
    }

    /// Percentage of all voxels that are `Alive`.
    pub fn efficiency(&self) -> f64 {
        self.count(VoxelState::Alive) as f64 / self.len() as f64 * 100.0
    }

    /// Percentage of the voxels that are not `Dead` which are `Alive`.
    ///
    /// Unlike [`efficiency`](Self::efficiency) this ignores voxels excluded by
    /// the bounding mesh. Returns 0 when every voxel is dead.
    pub fn usable_efficiency(&self) -> f64 {
        let usable = self.len() - self.count(VoxelState::Dead);
        if usable == 0 {
            return 0.0;
        }
        self.count(VoxelState::Alive) as f64 / usable as f64 * 100.0
    }

    /// Permanently disables every voxel matching `predicate`.
    ///
    /// # Returns
    /// The number of voxels that became `Dead`.
    pub fn mark_unavailable(&mut self, mut predicate: impl FnMut(&Voxel) -> bool) -> usize {
        let mut disabled = 0;
        for voxel in self.voxels.iter_mut() {
            if voxel.state() != VoxelState::Dead && predicate(voxel) {
                voxel.set_state(VoxelState::Dead);
                disabled += 1;
            }
        }
        disabled
    }

    /// Disables every voxel whose centre is outside `mesh`.
    pub fn disable_outside_bounding_mesh(&mut self, mesh: &BoundingMesh) -> usize {
        self.mark_unavailable(|voxel| !mesh.is_inside(voxel.centre))
    }

    /// Returns every `Alive` voxel to `Available`.
    ///
    /// # Returns
    /// Flat indices of the voxels that changed.
    pub(crate) fn reset_alive(&mut self) -> Vec<usize> {
        let mut changed = Vec::new();
        for (flat, voxel) in self.voxels.iter_mut().enumerate() {
            if voxel.state() == VoxelState::Alive {
                voxel.set_state(VoxelState::Available);
                changed.push(flat);
            }
        }
        changed
    }

    pub(crate) fn set_voxel_state(&mut self, flat: usize, state: VoxelState) {
        self.voxels.at_mut(flat).set_state(state);
    }

    pub(crate) fn set_voxel_color(&mut self, flat: usize, color: Color) {
        self.voxels.at_mut(flat).set_color(color);
    }

    /// Faces perpendicular to `axis`.
    pub fn faces(&self, axis: Axis) -> &GridArray<Face> {
        &self.faces[axis.index()]
    }

    /// Resolves a face handle.
    pub fn face(&self, face: &FaceRef) -> Option<&Face> {
        self.faces[face.direction.index()].get(face.index)
    }

    /// The six faces of the voxel at `index`, ordered `-X, +X, -Y, +Y, -Z, +Z`.
    pub fn voxel_faces(&self, index: Point3<i32>) -> Option<[&Face; 6]> {
        self.voxel(index)?;
        let face = move |axis: Axis, index: Point3<i32>| self.faces[axis.index()].get(index);
        Some([
            face(Axis::X, index)?,
            face(Axis::X, index + Axis::X.unit())?,
            face(Axis::Y, index)?,
            face(Axis::Y, index + Axis::Y.unit())?,
            face(Axis::Z, index)?,
            face(Axis::Z, index + Axis::Z.unit())?,
        ])
    }

    /// Edges running along `axis`.
    pub fn edges(&self, axis: Axis) -> &GridArray<Edge> {
        &self.edges[axis.index()]
    }

    /// All corners.
    pub fn corners(&self) -> &GridArray<Corner> {
        &self.corners
    }
}
