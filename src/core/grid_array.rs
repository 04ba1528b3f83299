//! # Grid Array Module
//!
//! A dense 3D array stored flat in x-major order (x, then y, then z). The
//! voxel grid uses it for its cells and for every derived topology array, so
//! flattened iteration is deterministic everywhere.

use cgmath::{Point3, Vector3};

/// A dense, fixed-size 3D array addressed by integer indices.
#[derive(Clone, Debug)]
pub struct GridArray<T> {
    /// Extent along each axis
    size: Vector3<i32>,
    /// Elements in x-major order
    elements: Vec<T>,
}

impl<T> GridArray<T> {
    /// Builds an array by calling `create` for every index in x-major order.
    ///
    /// # Arguments
    /// * `size` - Extent along each axis (every component must be non-negative)
    /// * `create` - Produces the element stored at an index
    pub fn from_fn(size: Vector3<i32>, mut create: impl FnMut(Point3<i32>) -> T) -> Self {
        let capacity = [size.x, size.y, size.z]
            .iter()
            .map(|&extent| extent.max(0) as usize)
            .product();
        let mut elements = Vec::with_capacity(capacity);

        for x in 0..size.x {
            for y in 0..size.y {
                for z in 0..size.z {
                    elements.push(create(Point3::new(x, y, z)));
                }
            }
        }

        GridArray { size, elements }
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vector3<i32> {
        self.size
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Flat position of `index`, or `None` when it lies outside the array.
    pub fn flat_index(&self, index: Point3<i32>) -> Option<usize> {
        flat_index(index, self.size)
    }

    /// Element at `index`, if it is in range.
    pub fn get(&self, index: Point3<i32>) -> Option<&T> {
        self.flat_index(index).map(|flat| &self.elements[flat])
    }

    /// Element at a flat position.
    ///
    /// # Panics
    /// Panics if `flat` is out of range.
    pub fn at(&self, flat: usize) -> &T {
        &self.elements[flat]
    }

    /// Mutable element at a flat position.
    ///
    /// # Panics
    /// Panics if `flat` is out of range.
    pub fn at_mut(&mut self, flat: usize) -> &mut T {
        &mut self.elements[flat]
    }

    /// Iterates over the elements in x-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    /// Iterates mutably over the elements in x-major order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.elements.iter_mut()
    }
}

/// Flattens `index` for an array of `size` in x-major order.
pub fn flat_index(index: Point3<i32>, size: Vector3<i32>) -> Option<usize> {
    if !super::orientation::check_bounds(index, size) {
        return None;
    }
    let (x, y, z) = (index.x as usize, index.y as usize, index.z as usize);
    Some((x * size.y as usize + y) * size.z as usize + z)
}
