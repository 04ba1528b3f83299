//! # Generator Module
//!
//! The brute-force search for a good fill and the bookkeeping around it.
//!
//! ## Key Components
//! - `BruteForceFiller`: Sequential, steppable search driver
//! - `parallel_search`: The same search with one trial per worker task
//! - `SeedLedger`: Top-K record of `(seed, efficiency)` pairs
//! - `GridSnapshot`: Serializable view of a fill
//!
//! ## Architecture
//! A search starts from a prepared grid: sized to the bounding volumes and
//! with every voxel outside them already dead. Trials only ever flip voxels
//! between `Available` and `Alive`, so the prepared grid can be reused (or
//! cloned, for parallel trials) for every seed.

pub mod brute_force;
pub mod ledger;
pub mod parallel;
pub mod snapshot;

use std::sync::Arc;

use crate::config::FillerConfig;
use crate::error::FillerResult;
use crate::placement::{BuildingManager, PatternLibrary};
use crate::voxels::grid::VoxelGrid;

// Re-export types for easier access
pub use brute_force::{run_trial, BruteForceFiller, SearchConfig, TrialResult};
pub use ledger::{LedgerEntry, SeedLedger};
pub use parallel::parallel_search;
pub use snapshot::GridSnapshot;

/// Builds the grid described by `config` with the bounding mesh applied.
pub fn prepare_grid(config: &FillerConfig) -> FillerResult<VoxelGrid> {
    let mesh = config.bounding_mesh()?;
    VoxelGrid::from_bounding_mesh(&mesh, config.voxel_offset, config.voxel_size)
}

/// Runs the full search over a prepared grid.
///
/// With `workers == 0` the trials run one after another on the calling
/// thread; otherwise they run on a pool of `workers` threads. Both give the
/// same ledger.
pub fn search(
    grid: &VoxelGrid,
    patterns: Arc<PatternLibrary>,
    config: &SearchConfig,
    workers: usize,
) -> FillerResult<SeedLedger> {
    if workers > 0 {
        return parallel_search(grid, patterns, config, workers);
    }

    let manager = BuildingManager::new(grid.clone(), patterns)?;
    let mut filler = BruteForceFiller::new(manager, *config);
    filler.run()?;
    Ok(filler.ledger().clone())
}
