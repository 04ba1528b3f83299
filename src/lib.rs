#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Filler
//!
//! Fills a closed volume with non-overlapping, rotated multi-voxel blocks and
//! searches for the random seeds that fill it best.
//!
//! The volume is discretized into a voxel grid; voxels outside the enclosing
//! surface are disabled once, up front. Blocks are instances of a small
//! library of shapes ("patterns"), anchored on a voxel and turned by one of
//! the 24 axis-aligned rotations. A brute-force search makes thousands of
//! random placement attempts per seed and keeps the best seeds in a ranked
//! ledger.
//!
//! ## Key Modules
//!
//! * `core` - Axes, dense 3D arrays and lattice rotations
//! * `voxels` - Voxels, the voxel grid with its faces, edges and corners, and
//!   the containment test against the bounding mesh
//! * `placement` - Patterns, blocks and the manager that places them
//! * `generator` - The seeded search, its ledger and snapshots of the result
//! * `task_management` - The worker pool used by the parallel search
//! * `config` - JSON configuration
//! * `error` - The crate's error type
//!
//! ## Architecture
//!
//! The grid is owned by exactly one `BuildingManager`, which is its only
//! writer. The pattern library is immutable and shared behind an `Arc`.
//! Parallel trials each work on their own clone of the prepared grid.
//!
//! ## Usage
//!
//! ```rust
//! use voxel_filler::config::FillerConfig;
//!
//! let config = FillerConfig::from_json_str(r#"{
//!     "voxel_size": 0.5,
//!     "voxel_offset": 0,
//!     "tries_per_iteration": 50,
//!     "iterations": 3,
//!     "bounding_volumes": [{ "type": "cuboid", "min": [0, 0, 0], "max": [3, 3, 3] }]
//! }"#).unwrap();
//!
//! let snapshot = voxel_filler::fill(&config).unwrap();
//! assert_eq!(snapshot.size, [6, 6, 6]);
//! assert_eq!(snapshot.ledger.len(), 3);
//! ```

use log::info;
use web_time::Instant;

pub mod config;
pub mod core;
pub mod error;
pub mod generator;
pub mod placement;
pub mod task_management;
pub mod voxels;

use config::FillerConfig;
use error::{FillerError, FillerResult};
use generator::{BruteForceFiller, GridSnapshot};
use placement::{BuildingManager, LogListener};

/// Runs the search described by `config` and replays the best seed.
///
/// # Returns
/// A snapshot of the grid filled with the best seed, with the full ledger.
pub fn fill(config: &FillerConfig) -> FillerResult<GridSnapshot> {
    let started = Instant::now();

    let grid = generator::prepare_grid(config)?;
    let patterns = config.pattern_library()?;
    let search_config = config.search_config();

    let ledger = generator::search(&grid, patterns.clone(), &search_config, config.workers)?;
    let best = ledger
        .best()
        .copied()
        .ok_or_else(|| FillerError::invalid_config("the search ran no trials"))?;

    let manager = BuildingManager::new(grid, patterns)?.with_listener(Box::new(LogListener));
    let mut filler = BruteForceFiller::new(manager, search_config);
    let replay = filler.replay_seed(best.seed)?;

    info!(
        "Best seed {} fills {:.2}% ({:.2}% of usable voxels) with {} blocks, {:?} total",
        replay.seed,
        replay.efficiency,
        filler.manager().usable_efficiency(),
        replay.number_of_blocks,
        started.elapsed()
    );

    Ok(GridSnapshot::capture(filler.manager(), Some(replay.seed), &ledger))
}

/// Entry point of the `voxel-filler` binary.
///
/// Initializes logging from `RUST_LOG`, loads the configuration named by the
/// first argument (or `VOXEL_FILLER_CONFIG`), runs [`fill`] and prints the
/// snapshot as JSON on stdout.
pub fn run() -> FillerResult<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    let config = FillerConfig::from_args(std::env::args().skip(1))?;
    let snapshot = fill(&config)?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
