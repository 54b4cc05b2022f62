//! A single-threaded cooperative scheduler with priority-tiered queues.
//!
//! Work is drained in a strict order: every queued microtask (including the
//! ones microtasks enqueue) runs before any expired timer, and expired timers
//! run before low-priority tasks. See [`LocalScheduler::drain`].

pub mod chain;
pub mod clock;
pub mod config;
pub mod error;
pub mod queue;
pub mod scheduler;
pub mod task;
pub mod timer;

use std::time::Duration;

/// The scheduling surface handed to embedding programs and to running tasks.
///
/// Tasks that need to wait never block; they schedule a continuation through
/// one of these entry points and return.
pub trait Scheduler {
    /// Schedule a microtask (highest priority).
    /// Runs before the next timer or low-priority task.
    fn schedule_microtask(&self, task: impl Into<Task>) -> TaskId;

    /// Schedule a timer that becomes eligible once `delay` has elapsed.
    fn schedule_timer(&self, task: impl Into<Task>, delay: Duration) -> TimerId;

    /// Remove a pending timer. Returns `false` if it already ran, was already
    /// popped for execution, or was cancelled before.
    fn cancel_timer(&self, timer: TimerId) -> bool;

    /// Schedule a low-priority task (runs after microtasks and expired timers).
    fn schedule_low_priority(&self, task: impl Into<Task>) -> TaskId;

    /// Current reading of the scheduler's monotonic clock.
    fn now(&self) -> Duration;
}

pub use chain::Chain;
pub use clock::{Clock, LogicalClock, SystemClock};
pub use config::SchedulerConfig;
pub use error::{SchedulerError, TaskFailure};
pub use scheduler::{DrainReport, LocalScheduler};
pub use task::{BoxError, Task, TaskId, TaskResult, Tier};
pub use timer::TimerId;
