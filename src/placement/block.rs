//! # Block Module
//!
//! One placement of a pattern: a pattern oriented by a [`Rotation`] and
//! anchored on a grid index.
//!
//! A block's [`BlockState`] is never stored. Apart from the `Placed` flag it
//! is recomputed from grid occupancy on every call to [`Block::state`], so a
//! block can't hold on to a stale "valid" verdict after a neighbouring voxel
//! changes.

use cgmath::Point3;
use log::trace;

use crate::core::{orient_index, Rotation};
use crate::voxels::grid::VoxelGrid;
use crate::voxels::voxel::{Color, VoxelState};

use super::pattern::{Pattern, PatternType};

/// Validity of a block against the current grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockState {
    /// Every cell is inside the grid and available.
    Valid,
    /// At least one offset falls outside the grid.
    OutOfBounds,
    /// Every cell is inside the grid but at least one is taken or dead.
    Intersecting,
    /// The block has been committed and owns its cells.
    Placed,
}

/// A candidate or committed placement of a pattern.
#[derive(Clone, Debug)]
pub struct Block {
    pattern: PatternType,
    anchor: Point3<i32>,
    rotation: Rotation,
    pattern_len: usize,
    voxels: Vec<usize>,
    placed: bool,
}

impl Block {
    /// Resolves `pattern` at `anchor` under `rotation`.
    ///
    /// Offsets that fall outside the grid are dropped rather than reported;
    /// the shortfall is what makes the block [`BlockState::OutOfBounds`].
    ///
    /// # Arguments
    /// * `pattern` - The shape to place
    /// * `anchor` - Grid index the pattern's zero offset lands on
    /// * `rotation` - Orientation of the pattern
    /// * `grid` - The grid the block is resolved against
    pub fn new(pattern: &Pattern, anchor: Point3<i32>, rotation: Rotation, grid: &VoxelGrid) -> Self {
        let size = grid.size();
        let voxels = pattern
            .offsets()
            .iter()
            .filter_map(|&offset| orient_index(offset, anchor, rotation, size))
            .filter_map(|index| grid.flat_index(index))
            .collect();

        Block {
            pattern: pattern.id(),
            anchor,
            rotation,
            pattern_len: pattern.len(),
            voxels,
            placed: false,
        }
    }

    /// The pattern this block places.
    pub fn pattern(&self) -> PatternType {
        self.pattern
    }

    /// Grid index of the pattern's zero offset.
    pub fn anchor(&self) -> Point3<i32> {
        self.anchor
    }

    /// Orientation of the pattern.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Flat indices of the cells that resolved inside the grid.
    pub fn voxels(&self) -> &[usize] {
        &self.voxels
    }

    /// Whether the block has been committed.
    pub fn is_placed(&self) -> bool {
        self.placed
    }

    /// Evaluates the block against the grid's current occupancy.
    pub fn state(&self, grid: &VoxelGrid) -> BlockState {
        if self.placed {
            BlockState::Placed
        } else if self.voxels.len() < self.pattern_len {
            BlockState::OutOfBounds
        } else if self.voxels.iter().all(|&flat| grid.voxel_at(flat).is_available()) {
            BlockState::Valid
        } else {
            BlockState::Intersecting
        }
    }

    /// Claims the block's cells.
    ///
    /// # Returns
    /// `true` if the block was `Valid` and is now `Placed`. Otherwise the grid
    /// is left untouched.
    pub(crate) fn commit(&mut self, grid: &mut VoxelGrid, color: Color) -> bool {
        if self.state(grid) != BlockState::Valid {
            return false;
        }

        for &flat in &self.voxels {
            grid.set_voxel_state(flat, VoxelState::Alive);
            grid.set_voxel_color(flat, color);
        }
        self.placed = true;

        trace!(
            "Placed {:?} at {:?} with rotation {:?}",
            self.pattern,
            self.anchor,
            self.rotation.euler_degrees()
        );
        true
    }

    /// Gives the block's cells back to the grid.
    ///
    /// Only a placed block owns cells; releasing an unplaced block does not
    /// touch the grid.
    ///
    /// # Returns
    /// `true` if any cell changed.
    pub(crate) fn release(&mut self, grid: &mut VoxelGrid) -> bool {
        if !self.placed {
            return false;
        }

        for &flat in &self.voxels {
            grid.set_voxel_state(flat, VoxelState::Available);
        }
        self.placed = false;
        true
    }
}
