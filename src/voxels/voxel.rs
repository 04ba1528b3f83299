//! # Voxel Module
//!
//! A single cell of the grid and the occupancy state it carries.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

/// Occupancy of a single voxel.
///
/// The state is the one source of truth for collisions: a block may only claim
/// voxels that are `Available`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoxelState {
    /// Free to be claimed by a block.
    Available,
    /// Claimed by a placed block.
    Alive,
    /// Permanently excluded, e.g. because the voxel lies outside the bounding volume.
    Dead,
}

/// An RGB colour with components in `0.0..1.0`.
///
/// Only meaningful to a presentation layer; the filler itself never reads it.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
}

impl Color {
    /// Draws a random colour, each channel one of 255 evenly spaced steps.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Color {
            r: rng.u8(0..255) as f32 / 255.0,
            g: rng.u8(0..255) as f32 / 255.0,
            b: rng.u8(0..255) as f32 / 255.0,
        }
    }
}

/// One unit of the discretized volume.
///
/// The index and centre are fixed when the grid is built. The state and colour
/// change only through the owning [`VoxelGrid`](super::grid::VoxelGrid).
#[derive(Clone, Debug)]
pub struct Voxel {
    /// Integer index of the voxel in the grid
    pub index: Point3<i32>,
    /// World-space centre of the voxel
    pub centre: Point3<f64>,
    state: VoxelState,
    color: Option<Color>,
}

impl Voxel {
    /// Creates an `Available` voxel with no colour.
    pub fn new(index: Point3<i32>, centre: Point3<f64>) -> Self {
        Voxel {
            index,
            centre,
            state: VoxelState::Available,
            color: None,
        }
    }

    /// Current occupancy.
    pub fn state(&self) -> VoxelState {
        self.state
    }

    /// Colour of the block occupying this voxel, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Shorthand for `state() == VoxelState::Available`.
    pub fn is_available(&self) -> bool {
        self.state == VoxelState::Available
    }

    pub(crate) fn set_state(&mut self, state: VoxelState) {
        self.state = state;
        if state != VoxelState::Alive {
            self.color = None;
        }
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = Some(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_voxel_is_available() {
        let voxel = Voxel::new(Point3::new(1, 2, 3), Point3::new(1.5, 2.5, 3.5));
        assert!(voxel.is_available());
        assert!(voxel.color().is_none());
    }

    #[test]
    fn test_leaving_alive_clears_color() {
        let mut voxel = Voxel::new(Point3::new(0, 0, 0), Point3::new(0.5, 0.5, 0.5));
        voxel.set_state(VoxelState::Alive);
        voxel.set_color(Color { r: 1.0, g: 0.0, b: 0.0 });
        assert!(voxel.color().is_some());

        voxel.set_state(VoxelState::Available);
        assert!(voxel.color().is_none());
    }

    #[test]
    fn test_random_color_range() {
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..100 {
            let color = Color::random(&mut rng);
            for channel in [color.r, color.g, color.b] {
                assert!((0.0..1.0).contains(&channel));
            }
        }
    }
}
