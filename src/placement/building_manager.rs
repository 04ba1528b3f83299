//! # Building Manager Module
//!
//! Owns the voxel grid and the blocks placed into it, and is the only writer
//! of grid occupancy.
//!
//! ## Pending Blocks
//!
//! Proposals are appended as pending blocks and do not touch the grid.
//! [`BuildingManager::commit_pending`] then commits all of them at once, or
//! none. A pending block is checked against the committed cells and against
//! the cells of every pending block proposed before it, so two pending blocks
//! that overlap can never both be committed: the later one reports
//! [`BlockState::Intersecting`].
//!
//! Blocks are kept in proposal order and committed in that order, which keeps
//! the colour draws (and everything else) reproducible for a fixed seed.

use std::mem;
use std::sync::Arc;

use bitvec::prelude::*;
use cgmath::Point3;
use log::{debug, trace};

use crate::core::Rotation;
use crate::error::{FillerError, FillerResult};
use crate::voxels::grid::VoxelGrid;
use crate::voxels::voxel::Color;

use super::block::{Block, BlockState};
use super::listener::VoxelListener;
use super::pattern::{PatternLibrary, PatternType};

/// Places blocks into an owned grid.
pub struct BuildingManager {
    grid: VoxelGrid,
    patterns: Arc<PatternLibrary>,
    blocks: Vec<Block>,
    current_pattern: PatternType,
    rng: fastrand::Rng,
    listener: Option<Box<dyn VoxelListener>>,
}

impl BuildingManager {
    /// Takes ownership of `grid` and places patterns from `patterns` into it.
    ///
    /// The current pattern starts as the first registered type.
    ///
    /// # Errors
    /// [`FillerError::InvalidConfig`] if the library holds no patterns.
    pub fn new(grid: VoxelGrid, patterns: Arc<PatternLibrary>) -> FillerResult<Self> {
        let current_pattern = patterns
            .types()
            .first()
            .copied()
            .ok_or_else(|| FillerError::invalid_config("the pattern library is empty"))?;

        Ok(BuildingManager {
            grid,
            patterns,
            blocks: Vec::new(),
            current_pattern,
            rng: fastrand::Rng::with_seed(0),
            listener: None,
        })
    }

    /// Attaches a sink that is told about every voxel change.
    pub fn with_listener(mut self, listener: Box<dyn VoxelListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Restarts the generator used for block colours.
    pub fn reseed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }

    /// The grid being filled.
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Gives the grid back, dropping all blocks.
    pub fn into_grid(self) -> VoxelGrid {
        self.grid
    }

    /// The library patterns are taken from.
    pub fn patterns(&self) -> &Arc<PatternLibrary> {
        &self.patterns
    }

    /// Pattern used by [`add_block`](Self::add_block).
    pub fn current_pattern(&self) -> PatternType {
        self.current_pattern
    }

    /// Changes the pattern used by [`add_block`](Self::add_block).
    ///
    /// # Errors
    /// [`FillerError::PatternNotFound`] if `id` is not in the library.
    pub fn set_pattern(&mut self, id: PatternType) -> FillerResult<()> {
        self.patterns.get(id)?;
        self.current_pattern = id;
        Ok(())
    }

    /// Picks the current pattern uniformly from the registered types.
    pub fn set_random_type(&mut self, rng: &mut fastrand::Rng) {
        let types = self.patterns.types();
        if let Some(&id) = types.get(rng.usize(0..types.len())) {
            self.current_pattern = id;
        }
    }

    /// All blocks, placed ones and pending ones, in proposal order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of placed blocks.
    pub fn number_of_blocks(&self) -> usize {
        self.blocks.iter().filter(|block| block.is_placed()).count()
    }

    /// Percentage of all voxels that are occupied.
    pub fn efficiency(&self) -> f64 {
        self.grid.efficiency()
    }

    /// Percentage of the non-dead voxels that are occupied.
    pub fn usable_efficiency(&self) -> f64 {
        self.grid.usable_efficiency()
    }

    /// Proposes a block of pattern `id`.
    ///
    /// The block is appended as pending; the grid is not changed.
    ///
    /// # Returns
    /// The state of the new block, taking earlier pending blocks into account.
    ///
    /// # Errors
    /// [`FillerError::PatternNotFound`] if `id` is not in the library.
    pub fn propose(
        &mut self,
        anchor: Point3<i32>,
        rotation: Rotation,
        id: PatternType,
    ) -> FillerResult<BlockState> {
        let pattern = self.patterns.get(id)?;
        let block = Block::new(pattern, anchor, rotation, &self.grid);
        self.blocks.push(block);

        let state = self.block_states()[self.blocks.len() - 1];
        trace!("Proposed {id:?} at {anchor:?}: {state:?}");
        Ok(state)
    }

    /// Proposes a block of the current pattern.
    pub fn add_block(&mut self, anchor: Point3<i32>, rotation: Rotation) -> FillerResult<BlockState> {
        self.propose(anchor, rotation, self.current_pattern)
    }

    /// States of every block, in proposal order.
    ///
    /// A pending block whose cells overlap an earlier pending block is
    /// reported as `Intersecting` even if its cells are all available.
    pub fn block_states(&self) -> Vec<BlockState> {
        let mut claimed = bitvec![0; self.grid.len()];

        self.blocks
            .iter()
            .map(|block| {
                let state = block.state(&self.grid);
                if state == BlockState::Placed {
                    return state;
                }

                let overlaps = block.voxels().iter().any(|&flat| claimed[flat]);
                for &flat in block.voxels() {
                    claimed.set(flat, true);
                }

                if state == BlockState::Valid && overlaps {
                    BlockState::Intersecting
                } else {
                    state
                }
            })
            .collect()
    }

    /// State of the block at position `index` in [`blocks`](Self::blocks).
    pub fn pending_state(&self, index: usize) -> Option<BlockState> {
        self.block_states().get(index).copied()
    }

    /// Commits every pending block.
    ///
    /// # Returns
    /// `false`, without changing anything, if there is no pending block or any
    /// pending block is not `Valid`.
    pub fn commit_pending(&mut self) -> bool {
        let states = self.block_states();
        let pending: Vec<usize> = (0..self.blocks.len())
            .filter(|&index| states[index] != BlockState::Placed)
            .collect();

        if pending.is_empty() {
            return false;
        }
        if let Some(&index) = pending.iter().find(|&&index| states[index] != BlockState::Valid) {
            trace!("Pending block {index} is {:?}, nothing committed", states[index]);
            return false;
        }

        for index in pending {
            let color = Color::random(&mut self.rng);
            let block = &mut self.blocks[index];
            if block.commit(&mut self.grid, color) {
                notify(&mut self.listener, &self.grid, block.voxels());
            }
        }
        true
    }

    /// Drops every block that is not placed.
    pub fn purge_unplaced(&mut self) {
        let (placed, unplaced): (Vec<Block>, Vec<Block>) =
            mem::take(&mut self.blocks).into_iter().partition(Block::is_placed);

        for mut block in unplaced {
            if block.release(&mut self.grid) {
                notify(&mut self.listener, &self.grid, block.voxels());
            }
        }
        self.blocks = placed;
    }

    /// Drops every block and returns all occupied voxels to `Available`.
    ///
    /// Voxels excluded by the bounding mesh stay dead.
    pub fn purge_all(&mut self) {
        let blocks = mem::take(&mut self.blocks);
        let count = blocks.len();

        for mut block in blocks {
            if block.release(&mut self.grid) {
                notify(&mut self.listener, &self.grid, block.voxels());
            }
        }

        let stray = self.grid.reset_alive();
        notify(&mut self.listener, &self.grid, &stray);

        debug!("Purged {count} blocks");
    }
}

fn notify(listener: &mut Option<Box<dyn VoxelListener>>, grid: &VoxelGrid, voxels: &[usize]) {
    if let Some(listener) = listener {
        for &flat in voxels {
            listener.voxel_changed(grid.voxel_at(flat));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use cgmath::Vector3;

    use super::*;
    use crate::placement::pattern::default_library;
    use crate::voxels::voxel::{Voxel, VoxelState};

    struct Recorder(Arc<Mutex<Vec<(Point3<i32>, VoxelState)>>>);

    impl VoxelListener for Recorder {
        fn voxel_changed(&mut self, voxel: &Voxel) {
            self.0.lock().unwrap().push((voxel.index, voxel.state()));
        }
    }

    fn manager() -> BuildingManager {
        let mut library = PatternLibrary::new();
        library.register(
            vec![Vector3::new(0, 0, 0), Vector3::new(1, 0, 0)],
            PatternType::PatternA,
        );
        let grid = VoxelGrid::new(Vector3::new(4, 4, 4), 1.0, Point3::new(0.0, 0.0, 0.0)).unwrap();
        BuildingManager::new(grid, Arc::new(library)).unwrap()
    }

    #[test]
    fn test_empty_library_is_rejected() {
        let grid = VoxelGrid::new(Vector3::new(2, 2, 2), 1.0, Point3::new(0.0, 0.0, 0.0)).unwrap();
        assert!(BuildingManager::new(grid, Arc::new(PatternLibrary::new())).is_err());
    }

    #[test]
    fn test_propose_does_not_touch_grid() {
        let mut manager = manager();
        let state = manager
            .propose(Point3::new(0, 0, 0), Rotation::IDENTITY, PatternType::PatternA)
            .unwrap();
        assert_eq!(state, BlockState::Valid);
        assert_eq!(manager.grid().count(VoxelState::Alive), 0);
        assert_eq!(manager.number_of_blocks(), 0);
        assert_eq!(manager.blocks().len(), 1);
    }

    #[test]
    fn test_propose_unregistered_pattern() {
        let mut manager = manager();
        assert!(matches!(
            manager.propose(Point3::new(0, 0, 0), Rotation::IDENTITY, PatternType::PatternB),
            Err(FillerError::PatternNotFound(PatternType::PatternB))
        ));
        assert!(manager.set_pattern(PatternType::PatternB).is_err());
        assert!(manager.blocks().is_empty());
    }

    #[test]
    fn test_overlapping_pending_blocks() {
        let mut manager = manager();
        manager.add_block(Point3::new(0, 0, 0), Rotation::IDENTITY).unwrap();
        let second = manager.add_block(Point3::new(1, 0, 0), Rotation::IDENTITY).unwrap();
        assert_eq!(second, BlockState::Intersecting);
        assert_eq!(manager.pending_state(0), Some(BlockState::Valid));

        assert!(!manager.commit_pending());
        assert_eq!(manager.grid().count(VoxelState::Alive), 0);

        manager.purge_unplaced();
        assert!(manager.blocks().is_empty());
    }

    #[test]
    fn test_disjoint_pending_blocks_commit_together() {
        let mut manager = manager();
        manager.add_block(Point3::new(0, 0, 0), Rotation::IDENTITY).unwrap();
        manager.add_block(Point3::new(2, 0, 0), Rotation::IDENTITY).unwrap();

        assert!(manager.commit_pending());
        assert_eq!(manager.number_of_blocks(), 2);
        assert_eq!(manager.grid().count(VoxelState::Alive), 4);
        assert_eq!(manager.block_states(), vec![BlockState::Placed; 2]);
    }

    #[test]
    fn test_commit_pending_twice() {
        let mut manager = manager();
        manager.add_block(Point3::new(0, 0, 0), Rotation::IDENTITY).unwrap();
        assert!(manager.commit_pending());
        assert!(!manager.commit_pending());
        assert_eq!(manager.grid().count(VoxelState::Alive), 2);
    }

    #[test]
    fn test_purge_all_keeps_dead_voxels() {
        let mut grid = VoxelGrid::new(Vector3::new(4, 4, 4), 1.0, Point3::new(0.0, 0.0, 0.0)).unwrap();
        grid.mark_unavailable(|voxel| voxel.index == Point3::new(3, 3, 3));
        let dead = grid.flat_index(Point3::new(3, 3, 3)).unwrap();
        let mut manager = BuildingManager::new(grid, default_library()).unwrap();
        manager.set_pattern(PatternType::PatternB).unwrap();

        manager.add_block(Point3::new(0, 0, 0), Rotation::IDENTITY).unwrap();
        assert_eq!(manager.pending_state(0), Some(BlockState::OutOfBounds));
        manager.purge_unplaced();

        let quarter = Rotation::from_euler_degrees(0.0, 0.0, 90.0).unwrap();
        manager.add_block(Point3::new(0, 3, 0), quarter).unwrap();
        assert!(!manager.commit_pending());
        manager.purge_unplaced();

        manager.set_pattern(PatternType::PatternA).unwrap();
        manager.add_block(Point3::new(0, 0, 0), Rotation::IDENTITY).unwrap();
        assert!(manager.commit_pending());
        assert_eq!(manager.grid().count(VoxelState::Alive), 7);

        manager.purge_all();
        assert!(manager.blocks().is_empty());
        assert_eq!(manager.grid().count(VoxelState::Alive), 0);
        assert_eq!(manager.grid().voxel_at(dead).state(), VoxelState::Dead);
    }

    #[test]
    fn test_listener_sees_every_change() {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let mut manager = manager().with_listener(Box::new(Recorder(Arc::clone(&changes))));

        manager.add_block(Point3::new(0, 0, 0), Rotation::IDENTITY).unwrap();
        assert!(manager.commit_pending());
        assert_eq!(
            *changes.lock().unwrap(),
            vec![
                (Point3::new(0, 0, 0), VoxelState::Alive),
                (Point3::new(1, 0, 0), VoxelState::Alive)
            ]
        );

        manager.purge_all();
        let changes = changes.lock().unwrap();
        assert_eq!(changes.len(), 4);
        assert!(changes[2..].iter().all(|(_, state)| *state == VoxelState::Available));
    }

    #[test]
    fn test_pending_blocks_commit_in_proposal_order() {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let mut manager = manager().with_listener(Box::new(Recorder(Arc::clone(&changes))));
        manager.reseed(5);

        manager.add_block(Point3::new(2, 3, 3), Rotation::IDENTITY).unwrap();
        manager.add_block(Point3::new(0, 0, 0), Rotation::IDENTITY).unwrap();
        assert!(manager.commit_pending());

        let order: Vec<_> = changes.lock().unwrap().iter().map(|(index, _)| *index).collect();
        assert_eq!(
            order,
            vec![
                Point3::new(2, 3, 3),
                Point3::new(3, 3, 3),
                Point3::new(0, 0, 0),
                Point3::new(1, 0, 0)
            ]
        );

        let mut rng = fastrand::Rng::with_seed(5);
        let first = Color::random(&mut rng);
        let second = Color::random(&mut rng);
        let color = |index| manager.grid().voxel(index).unwrap().color();
        assert_eq!(color(Point3::new(3, 3, 3)), Some(first));
        assert_eq!(color(Point3::new(1, 0, 0)), Some(second));
    }

    #[test]
    fn test_set_random_type_uses_registered_types() {
        let grid = VoxelGrid::new(Vector3::new(2, 2, 2), 1.0, Point3::new(0.0, 0.0, 0.0)).unwrap();
        let mut manager = BuildingManager::new(grid, default_library()).unwrap();
        let mut rng = fastrand::Rng::with_seed(11);

        let mut seen = Vec::new();
        for _ in 0..50 {
            manager.set_random_type(&mut rng);
            if !seen.contains(&manager.current_pattern()) {
                seen.push(manager.current_pattern());
            }
        }
        seen.sort();
        assert_eq!(seen, vec![PatternType::PatternA, PatternType::PatternB]);
    }
}
