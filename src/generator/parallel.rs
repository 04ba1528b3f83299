//! # Parallel Search Module
//!
//! Runs trials on the worker pool from [`task_management`](crate::task_management).
//!
//! Every seed becomes one [`TrialTask`]. The task clones the prepared grid,
//! builds its own [`BuildingManager`] around the copy and runs the trial, so no
//! two trials ever touch the same grid. Results are folded into the ledger on
//! the calling thread. Since the ledger order is total, the final ledger is the
//! same one a sequential search over the same seeds produces.

use std::sync::Arc;

use log::info;
use web_time::Instant;

use crate::error::{FillerError, FillerResult};
use crate::placement::{BuildingManager, PatternLibrary};
use crate::task_management::task::{Task, TaskResult};
use crate::task_management::TaskManager;
use crate::voxels::grid::VoxelGrid;

use super::brute_force::{run_trial, SearchConfig, TrialResult};
use super::ledger::SeedLedger;

/// State the trial results are folded into.
#[derive(Debug)]
pub struct SearchProgress {
    /// The ranked seeds so far
    pub ledger: SeedLedger,
    /// Number of trials handled
    pub completed: usize,
    /// The first error a trial reported
    pub error: Option<FillerError>,
}

/// One trial to run on a worker.
pub struct TrialTask {
    template: Arc<VoxelGrid>,
    patterns: Arc<PatternLibrary>,
    config: SearchConfig,
    seed: u64,
}

struct TrialOutcome(FillerResult<TrialResult>);

impl Task<SearchProgress> for TrialTask {
    fn process(&self) -> Box<dyn TaskResult<SearchProgress> + Send> {
        let grid = VoxelGrid::clone(&self.template);
        let outcome = BuildingManager::new(grid, Arc::clone(&self.patterns))
            .and_then(|mut manager| run_trial(&mut manager, self.seed, &self.config));
        Box::new(TrialOutcome(outcome))
    }
}

impl TaskResult<SearchProgress> for TrialOutcome {
    fn handle_result(
        self: Box<Self>,
        progress: &mut SearchProgress,
    ) -> Vec<Box<dyn Task<SearchProgress> + Send>> {
        progress.completed += 1;
        match self.0 {
            Ok(result) => {
                progress.ledger.record(result.seed, result.efficiency);
            }
            Err(err) => {
                progress.error.get_or_insert(err);
            }
        }
        Vec::new()
    }
}

/// Runs every trial of `config` on `workers` threads.
///
/// `grid` is the prepared grid (bounding mesh applied, nothing placed); each
/// trial works on its own clone.
///
/// # Errors
/// The first error reported by a trial, or [`FillerError::InvalidConfig`] if
/// a worker died before finishing its trial.
pub fn parallel_search(
    grid: &VoxelGrid,
    patterns: Arc<PatternLibrary>,
    config: &SearchConfig,
    workers: usize,
) -> FillerResult<SeedLedger> {
    info!(
        "Searching {} trials of {} tries from seed {} on {} workers",
        config.iterations, config.tries_per_iteration, config.start_seed, workers
    );
    let started = Instant::now();

    let template = Arc::new(grid.clone());
    let mut task_manager = TaskManager::new(workers);
    for seed in (config.start_seed..).take(config.iterations) {
        task_manager.publish_task(Box::new(TrialTask {
            template: Arc::clone(&template),
            patterns: Arc::clone(&patterns),
            config: *config,
            seed,
        }));
    }

    let mut progress = SearchProgress {
        ledger: SeedLedger::new(config.ledger_capacity),
        completed: 0,
        error: None,
    };
    task_manager.run_to_completion(&mut progress);

    if let Some(err) = progress.error {
        return Err(err);
    }
    if progress.completed != config.iterations {
        return Err(FillerError::invalid_config(format!(
            "only {} of {} trials completed",
            progress.completed, config.iterations
        )));
    }

    info!(
        "Search finished in {:?}, best {:?}",
        started.elapsed(),
        progress.ledger.best()
    );
    Ok(progress.ledger)
}

#[cfg(test)]
mod tests {
    use cgmath::{Point3, Vector3};

    use super::*;
    use crate::generator::brute_force::BruteForceFiller;
    use crate::placement::default_library;

    #[test]
    fn test_matches_sequential_search() {
        let grid = VoxelGrid::new(Vector3::new(5, 5, 5), 1.0, Point3::new(0.0, 0.0, 0.0)).unwrap();
        let config = SearchConfig {
            tries_per_iteration: 100,
            iterations: 6,
            start_seed: 3,
            ledger_capacity: 4,
            randomize_pattern: true,
        };

        let parallel = parallel_search(&grid, default_library(), &config, 3).unwrap();

        let manager = BuildingManager::new(grid, default_library()).unwrap();
        let mut sequential = BruteForceFiller::new(manager, config);
        assert_eq!(&parallel, sequential.run().unwrap());
    }
}
