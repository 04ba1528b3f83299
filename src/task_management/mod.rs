//! # Task Management System
//!
//! A small pool of worker threads for CPU-bound work, used to evaluate many
//! search trials at once.
//!
//! ## Architecture Overview
//!
//! The task management system consists of several key components:
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed on a worker
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the calling thread and one worker
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and send back results
//! 4. Results are handled on the calling thread in `process_completed_tasks()`
//!    (non-blocking) or `run_to_completion()` (blocking)
//! 5. Results can spawn new tasks
//! 6. The cycle continues until all work is complete
//!
//! ## Example Usage
//! ```rust
//! use voxel_filler::task_management::{task::{Task, TaskResult}, TaskManager};
//!
//! struct Square(u64);
//! struct Squared(u64);
//!
//! impl Task<Vec<u64>> for Square {
//!     fn process(&self) -> Box<dyn TaskResult<Vec<u64>> + Send> {
//!         Box::new(Squared(self.0 * self.0))
//!     }
//! }
//!
//! impl TaskResult<Vec<u64>> for Squared {
//!     fn handle_result(self: Box<Self>, out: &mut Vec<u64>) -> Vec<Box<dyn Task<Vec<u64>> + Send>> {
//!         out.push(self.0);
//!         Vec::new()
//!     }
//! }
//!
//! let mut task_manager = TaskManager::new(2);
//! for n in 1..=4 {
//!     task_manager.publish_task(Box::new(Square(n)));
//! }
//!
//! let mut squares = Vec::new();
//! task_manager.run_to_completion(&mut squares);
//! squares.sort();
//! assert_eq!(squares, vec![1, 4, 9, 16]);
//! ```

pub mod task;

use log::{error, info, warn};
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use task::{Task, TaskResult};

/// A communication channel between the calling thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks to the worker
/// - `result_receiver`: Receives task results from the worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `disconnected`: Set once the worker is found gone; the channel is skipped from then on
/// - `_worker`: Handle to the worker thread (kept alive by this struct)
///
/// # Implementation Notes
/// - The worker exits once `task_sender` is dropped
/// - A worker whose task panics is gone for good, along with that task
#[derive(Debug)]
pub struct TaskChannel<C> {
    task_sender: Sender<Box<dyn Task<C> + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult<C> + Send>>,
    num_tasks_in_flight: usize,
    disconnected: bool,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and managing worker threads
/// - Distributing tasks across available workers
/// - Collecting and handling task results
/// - Queuing tasks while all workers are busy
///
/// A manager with zero workers still works: [`run_to_completion`](Self::run_to_completion)
/// then processes queued tasks on the calling thread.
pub struct TaskManager<C> {
    channels: Vec<TaskChannel<C>>,
    queued_tasks: VecDeque<Box<dyn Task<C> + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Set to 1 so that a worker that stalls only holds back one task.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl<C: 'static> TaskManager<C> {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {} workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task<C> + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult<C> + Send>>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                disconnected: false,
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of worker threads.
    pub fn num_workers(&self) -> usize {
        self.channels.len()
    }

    /// Number of worker threads that have not been found gone.
    pub fn num_live_workers(&self) -> usize {
        self.channels.iter().filter(|channel| !channel.disconnected).count()
    }

    /// Whether no task is queued or in flight.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty()
            && self.channels.iter().all(|channel| channel.num_tasks_in_flight == 0)
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the send failed; the channel is then marked disconnected
    fn try_send_task(
        &mut self,
        task: Box<dyn Task<C> + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task<C> + Send>> {
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(task) {
            Ok(_) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => {
                warn!("Worker {channel_idx} is gone, no longer scheduling on it");
                channel.disconnected = true;
                Err(task.0)
            }
        }
    }

    /// Finds an available worker channel that can accept a new task.
    ///
    /// Round-robin starting from the channel after the last one used,
    /// skipping disconnected channels and channels at `MAX_TASKS_IN_FLIGHT`.
    ///
    /// # Returns
    /// - `Some(usize)` index of an available channel
    /// - `None` if all live channels are busy or there are none
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        let start_channel = self.current_channel;
        let mut current = start_channel;

        loop {
            let channel = &self.channels[current];
            if !channel.disconnected && channel.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Publishes a new task for execution.
    ///
    /// The task is sent to a free worker, or queued if all workers are busy.
    /// A worker that turns out to be gone is skipped and the next one is tried.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued
    pub fn publish_task(&mut self, mut task: Box<dyn Task<C> + Send>) -> bool {
        while let Some(channel_idx) = self.find_available_channel() {
            match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    return true;
                }
                Err(returned) => task = returned,
            }
        }
        self.queued_tasks.push_back(task);
        false
    }

    /// Sends queued tasks to workers while workers are available.
    ///
    /// Tasks are sent in FIFO order. A task refused by a gone worker goes back
    /// to the front of the queue and the next worker is tried.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_front(task),
            }
        }
    }

    /// Handles every result that has already arrived, without blocking.
    ///
    /// # Returns
    /// Number of results handled.
    pub fn process_completed_tasks(&mut self, context: &mut C) -> usize {
        let mut tasks_to_queue = Vec::new();
        let mut handled = 0;

        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                tasks_to_queue.extend(result.handle_result(context));
                handled += 1;
            }
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
        handled
    }

    /// Blocks until every published task, and every task they spawn, is done.
    ///
    /// With no workers, tasks are processed on the calling thread. A worker
    /// that dies drops the task it was holding; this is logged and the
    /// remaining tasks go to the other workers, or to the calling thread once
    /// no worker is left.
    ///
    /// # Returns
    /// Number of results handled.
    pub fn run_to_completion(&mut self, context: &mut C) -> usize {
        let mut handled = 0;
        let mut running_inline = self.channels.is_empty();

        loop {
            self.process_queued_tasks();

            let Some(channel_idx) = self
                .channels
                .iter()
                .position(|channel| channel.num_tasks_in_flight > 0)
            else {
                // Nothing in flight: either done, or no worker is left to take the queue.
                let Some(task) = self.queued_tasks.pop_front() else {
                    return handled;
                };
                if !running_inline {
                    warn!(
                        "No worker left, running {} queued tasks inline",
                        self.queued_tasks.len() + 1
                    );
                    running_inline = true;
                }
                let spawned = task.process().handle_result(context);
                self.queued_tasks.extend(spawned);
                handled += 1;
                continue;
            };

            let channel = &mut self.channels[channel_idx];
            match channel.result_receiver.recv() {
                Ok(result) => {
                    channel.num_tasks_in_flight -= 1;
                    let spawned = result.handle_result(context);
                    handled += 1;
                    for task in spawned {
                        self.publish_task(task);
                    }
                }
                Err(_) => {
                    error!(
                        "Worker {} disconnected with {} tasks in flight",
                        channel_idx, channel.num_tasks_in_flight
                    );
                    channel.num_tasks_in_flight = 0;
                    channel.disconnected = true;
                }
            }

            handled += self.process_completed_tasks(context);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Count {
        remaining: u32,
    }

    struct Counted {
        remaining: u32,
    }

    impl Task<Vec<u32>> for Count {
        fn process(&self) -> Box<dyn TaskResult<Vec<u32>> + Send> {
            Box::new(Counted {
                remaining: self.remaining,
            })
        }
    }

    impl TaskResult<Vec<u32>> for Counted {
        fn handle_result(self: Box<Self>, seen: &mut Vec<u32>) -> Vec<Box<dyn Task<Vec<u32>> + Send>> {
            seen.push(self.remaining);
            if self.remaining == 0 {
                Vec::new()
            } else {
                vec![Box::new(Count {
                    remaining: self.remaining - 1,
                })]
            }
        }
    }

    #[test]
    fn test_spawned_tasks_are_run() {
        let mut manager = TaskManager::new(3);
        manager.publish_task(Box::new(Count { remaining: 4 }));

        let mut seen = Vec::new();
        assert_eq!(manager.run_to_completion(&mut seen), 5);
        assert_eq!(seen, vec![4, 3, 2, 1, 0]);
        assert!(manager.is_idle());
    }

    #[test]
    fn test_tasks_queue_when_workers_are_busy() {
        let mut manager = TaskManager::new(1);
        assert!(manager.publish_task(Box::new(Count { remaining: 0 })));
        assert!(!manager.publish_task(Box::new(Count { remaining: 0 })));
        assert!(!manager.is_idle());

        let mut seen = Vec::new();
        assert_eq!(manager.run_to_completion(&mut seen), 2);
        assert_eq!(seen, vec![0, 0]);
    }

    struct Explode;

    impl Task<Vec<u32>> for Explode {
        fn process(&self) -> Box<dyn TaskResult<Vec<u32>> + Send> {
            panic!("task failed");
        }
    }

    #[test]
    fn test_dead_worker_is_skipped() {
        let mut manager = TaskManager::new(2);
        assert!(manager.publish_task(Box::new(Explode)));
        for _ in 0..5 {
            manager.publish_task(Box::new(Count { remaining: 0 }));
        }

        let mut seen = Vec::new();
        assert_eq!(manager.run_to_completion(&mut seen), 5);
        assert_eq!(seen, vec![0; 5]);
        assert_eq!(manager.num_live_workers(), 1);
        assert!(manager.is_idle());
    }

    #[test]
    fn test_queue_runs_inline_once_every_worker_is_gone() {
        let mut manager = TaskManager::new(1);
        assert!(manager.publish_task(Box::new(Explode)));
        assert!(!manager.publish_task(Box::new(Count { remaining: 2 })));

        let mut seen = Vec::new();
        assert_eq!(manager.run_to_completion(&mut seen), 3);
        assert_eq!(seen, vec![2, 1, 0]);
        assert_eq!(manager.num_live_workers(), 0);
    }

    #[test]
    fn test_without_workers_runs_inline() {
        let mut manager = TaskManager::new(0);
        assert!(!manager.publish_task(Box::new(Count { remaining: 2 })));

        let mut seen = Vec::new();
        assert_eq!(manager.run_to_completion(&mut seen), 3);
        assert_eq!(seen, vec![2, 1, 0]);
    }
}
