//! # Task System Core Traits
//!
//! This module defines the two traits the worker pool is built on.
//!
//! ## Core Components
//! - `Task`: A unit of work executed on a worker thread
//! - `TaskResult`: The outcome of a task, handled back on the calling thread
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the thread that owns the manager,
//!    with mutable access to the caller's context `C`
//! 5. The result can spawn new tasks
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - `TaskResult` must be `Send` to be transferred back
//! - Tasks own their data; shared read-only state goes behind an `Arc`

/// A unit of work that can be executed on a worker thread.
///
/// Tasks should be self-contained and own all the data they need. A task
/// that mutates state must work on its own copy of it.
///
/// # Type Parameters
/// * `C` - The context results are folded into on the calling thread
pub trait Task<C>: Send {
    /// Processes the task and returns a result.
    ///
    /// Runs on a worker thread.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be handled on the calling thread.
    fn process(&self) -> Box<dyn TaskResult<C> + Send>;
}

/// The result of processing a [`Task`].
///
/// Results are handled on the thread that owns the `TaskManager` and may
/// update the caller's context or spawn more tasks.
pub trait TaskResult<C>: Send {
    /// Folds the result into `context`.
    ///
    /// # Returns
    /// New tasks to schedule (can be empty).
    fn handle_result(self: Box<Self>, context: &mut C) -> Vec<Box<dyn Task<C> + Send>>;
}
