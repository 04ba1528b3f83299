//! # Brute Force Filler Module
//!
//! The outer search loop. Each round ("trial") clears the grid, reseeds the
//! random generator with the round's seed and makes a fixed number of random
//! placement attempts. The resulting efficiency is recorded in a
//! [`SeedLedger`] under that seed.
//!
//! ## Determinism
//!
//! Everything random in a trial is drawn from one `fastrand::Rng` seeded with
//! the trial's seed, in a fixed order per attempt: pattern type (when
//! randomized), anchor, rotation. Block colours come from the manager's own
//! generator, reseeded with the same seed. Running a seed again reproduces the
//! trial exactly.
//!
//! ## Stepping
//!
//! [`BruteForceFiller::step`] runs one trial and returns, so a host can
//! advance the search one round per tick. [`BruteForceFiller::run`] and
//! [`BruteForceFiller::run_until`] loop over `step`.

use std::sync::atomic::{AtomicBool, Ordering};

use cgmath::{Point3, Vector3};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::core::Rotation;
use crate::error::FillerResult;
use crate::placement::BuildingManager;

use super::ledger::SeedLedger;

/// Parameters of a search.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Placement attempts per trial
    pub tries_per_iteration: usize,
    /// Number of trials
    pub iterations: usize,
    /// Seed of the first trial; later trials use the following seeds
    pub start_seed: u64,
    /// Number of best seeds kept in the ledger
    pub ledger_capacity: usize,
    /// Whether each attempt picks a random pattern type
    pub randomize_pattern: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            tries_per_iteration: 2500,
            iterations: 100,
            start_seed: 0,
            ledger_capacity: 10,
            randomize_pattern: true,
        }
    }
}

/// Outcome of a single trial.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Seed the trial was run with
    pub seed: u64,
    /// Percentage of all voxels filled
    pub efficiency: f64,
    /// Number of blocks placed
    pub number_of_blocks: usize,
}

/// Picks a uniformly random voxel index inside a grid of `size`.
pub fn random_index(rng: &mut fastrand::Rng, size: Vector3<i32>) -> Point3<i32> {
    Point3::new(rng.i32(0..size.x), rng.i32(0..size.y), rng.i32(0..size.z))
}

/// Picks one of the 24 lattice rotations uniformly.
pub fn random_rotation(rng: &mut fastrand::Rng) -> Rotation {
    Rotation::random(rng)
}

/// Runs one trial with `seed` on `manager`.
///
/// The grid is purged first. Every attempt proposes one block, tries to commit
/// it and discards it if that failed; failed attempts are not retried.
pub fn run_trial(
    manager: &mut BuildingManager,
    seed: u64,
    config: &SearchConfig,
) -> FillerResult<TrialResult> {
    let mut rng = fastrand::Rng::with_seed(seed);
    manager.reseed(seed);
    manager.purge_all();

    let size = manager.grid().size();
    for _ in 0..config.tries_per_iteration {
        if config.randomize_pattern {
            manager.set_random_type(&mut rng);
        }
        let anchor = random_index(&mut rng, size);
        let rotation = random_rotation(&mut rng);

        manager.add_block(anchor, rotation)?;
        manager.commit_pending();
        manager.purge_unplaced();
    }

    Ok(TrialResult {
        seed,
        efficiency: manager.efficiency(),
        number_of_blocks: manager.number_of_blocks(),
    })
}

/// Sequential driver of the search.
pub struct BruteForceFiller {
    manager: BuildingManager,
    config: SearchConfig,
    ledger: SeedLedger,
    next_seed: u64,
    completed: usize,
}

impl BruteForceFiller {
    /// Creates a search over the grid owned by `manager`.
    pub fn new(manager: BuildingManager, config: SearchConfig) -> Self {
        BruteForceFiller {
            manager,
            ledger: SeedLedger::new(config.ledger_capacity),
            next_seed: config.start_seed,
            completed: 0,
            config,
        }
    }

    /// Parameters of this search.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The ranked seeds so far.
    pub fn ledger(&self) -> &SeedLedger {
        &self.ledger
    }

    /// The manager, holding the grid as the last trial left it.
    pub fn manager(&self) -> &BuildingManager {
        &self.manager
    }

    /// Gives back the manager.
    pub fn into_manager(self) -> BuildingManager {
        self.manager
    }

    /// Seed the next trial will use.
    pub fn next_seed(&self) -> u64 {
        self.next_seed
    }

    /// Number of trials run so far.
    pub fn completed_iterations(&self) -> usize {
        self.completed
    }

    /// Whether every trial has been run.
    pub fn is_finished(&self) -> bool {
        self.completed >= self.config.iterations
    }

    /// Runs the next trial and records it.
    ///
    /// # Returns
    /// The trial's result, or `None` once the search is finished.
    pub fn step(&mut self) -> FillerResult<Option<TrialResult>> {
        if self.is_finished() {
            return Ok(None);
        }

        let started = Instant::now();
        let result = run_trial(&mut self.manager, self.next_seed, &self.config)?;
        self.ledger.record(result.seed, result.efficiency);
        self.next_seed += 1;
        self.completed += 1;

        debug!(
            "Trial {}/{} seed {}: {:.2}% with {} blocks in {:?}",
            self.completed,
            self.config.iterations,
            result.seed,
            result.efficiency,
            result.number_of_blocks,
            started.elapsed()
        );
        Ok(Some(result))
    }

    /// Runs every remaining trial.
    pub fn run(&mut self) -> FillerResult<&SeedLedger> {
        self.run_until(&AtomicBool::new(false))
    }

    /// Runs trials until the search is finished or `stop` is raised.
    ///
    /// `stop` is checked between trials; a trial that has started always
    /// completes.
    pub fn run_until(&mut self, stop: &AtomicBool) -> FillerResult<&SeedLedger> {
        info!(
            "Searching {} trials of {} tries from seed {}",
            self.config.iterations - self.completed.min(self.config.iterations),
            self.config.tries_per_iteration,
            self.next_seed
        );
        let started = Instant::now();

        while !self.is_finished() {
            if stop.load(Ordering::Relaxed) {
                info!("Search stopped after {} trials", self.completed);
                break;
            }
            self.step()?;
        }

        info!(
            "Search finished in {:?}, best {:?}",
            started.elapsed(),
            self.ledger.best()
        );
        Ok(&self.ledger)
    }

    /// Runs `seed` again without recording it, leaving its fill in the grid.
    pub fn replay_seed(&mut self, seed: u64) -> FillerResult<TrialResult> {
        run_trial(&mut self.manager, seed, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::default_library;
    use crate::voxels::grid::VoxelGrid;

    fn filler(config: SearchConfig) -> BruteForceFiller {
        let grid = VoxelGrid::new(Vector3::new(6, 6, 6), 1.0, Point3::new(0.0, 0.0, 0.0)).unwrap();
        let manager = BuildingManager::new(grid, default_library()).unwrap();
        BruteForceFiller::new(manager, config)
    }

    fn small() -> SearchConfig {
        SearchConfig {
            tries_per_iteration: 200,
            iterations: 5,
            start_seed: 0,
            ledger_capacity: 3,
            randomize_pattern: true,
        }
    }

    #[test]
    fn test_random_index_in_bounds() {
        let mut rng = fastrand::Rng::with_seed(1);
        let size = Vector3::new(2, 3, 1);
        for _ in 0..100 {
            let index = random_index(&mut rng, size);
            assert!(crate::core::check_bounds(index, size));
        }
    }

    #[test]
    fn test_step_consumes_increasing_seeds() {
        let mut filler = filler(small());
        let first = filler.step().unwrap().unwrap();
        let second = filler.step().unwrap().unwrap();
        assert_eq!((first.seed, second.seed), (0, 1));
        assert_eq!(filler.next_seed(), 2);
        assert_eq!(filler.ledger().len(), 2);
    }

    #[test]
    fn test_run_is_finite() {
        let mut filler = filler(small());
        let ledger = filler.run().unwrap();
        assert_eq!(ledger.len(), 3);
        assert!(filler.is_finished());
        assert_eq!(filler.completed_iterations(), 5);
        assert!(filler.step().unwrap().is_none());
    }

    #[test]
    fn test_run_until_stops_between_trials() {
        let mut filler = filler(small());
        let stop = AtomicBool::new(true);
        assert!(filler.run_until(&stop).unwrap().is_empty());
        assert_eq!(filler.completed_iterations(), 0);
    }

    #[test]
    fn test_replay_reproduces_the_trial() {
        let mut filler = filler(small());
        let result = filler.step().unwrap().unwrap();
        assert!(result.number_of_blocks > 0);
        filler.step().unwrap();

        let replay = filler.replay_seed(result.seed).unwrap();
        assert_eq!(replay, result);
        assert_eq!(filler.manager().number_of_blocks(), result.number_of_blocks);
    }

    #[test]
    fn test_trial_leaves_no_pending_blocks() {
        let mut filler = filler(small());
        filler.step().unwrap();
        let manager = filler.manager();
        assert!(manager.blocks().iter().all(|block| block.is_placed()));
        let alive: usize = manager.blocks().iter().map(|block| block.voxels().len()).sum();
        assert_eq!(alive, manager.grid().count(crate::voxels::voxel::VoxelState::Alive));
    }
}
