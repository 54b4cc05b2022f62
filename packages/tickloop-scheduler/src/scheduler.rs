use crate::Scheduler;
use crate::clock::{Clock, LogicalClock};
use crate::config::SchedulerConfig;
use crate::error::{SchedulerError, TaskFailure};
use crate::queue::{QueuedTask, TaskQueue};
use crate::task::{Task, TaskId, Tier};
use crate::timer::{TimerId, TimerSet};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::time::Duration;

/// Summary of one [`LocalScheduler::drain`] call.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct DrainReport {
    pub microtasks: usize,
    pub timers: usize,
    pub low_priority: usize,
    /// How many times drain had to wait on the clock for a future timer.
    pub clock_waits: usize,
    /// Failures caught while `halt_on_task_failure` was off.
    pub failures: SmallVec<[TaskFailure; 2]>,
}

impl DrainReport {
    pub fn executed(&self) -> usize {
        self.microtasks + self.timers + self.low_priority
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, tier: Tier) {
        match tier {
            Tier::Microtask => self.microtasks += 1,
            Tier::Timer => self.timers += 1,
            Tier::LowPriority => self.low_priority += 1,
            Tier::Synchronous => {}
        }
    }
}

/// Single-threaded cooperative scheduler.
///
/// Queues use interior mutability so that running tasks can schedule more
/// work through a shared reference (typically an `Rc<LocalScheduler>`).
/// No internal borrow is held while a task runs.
pub struct LocalScheduler<C: Clock = LogicalClock> {
    microtasks: TaskQueue,
    timers: RefCell<TimerSet>,
    low_priority: TaskQueue,
    clock: C,
    config: SchedulerConfig,
    sequence: Cell<u64>,
    draining: Cell<bool>,
}

impl LocalScheduler<LogicalClock> {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self::with_clock(config, LogicalClock::new())
    }
}

impl Default for LocalScheduler<LogicalClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> LocalScheduler<C> {
    pub fn with_clock(config: SchedulerConfig, clock: C) -> Self {
        Self {
            microtasks: TaskQueue::new(),
            timers: RefCell::new(TimerSet::new()),
            low_priority: TaskQueue::new(),
            clock,
            config,
            sequence: Cell::new(0),
            draining: Cell::new(false),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run `task` right now, ahead of anything queued.
    ///
    /// A failure is always returned to the caller, whatever
    /// `halt_on_task_failure` says.
    pub fn run_synchronous(&self, task: impl Into<Task>) -> Result<(), SchedulerError> {
        let queued = self.accept(Tier::Synchronous, task.into());
        self.execute(queued)?;
        Ok(())
    }

    /// Run queued work until every queue is empty and no timer is pending.
    ///
    /// Each step runs the single highest-priority ready task:
    ///
    /// 1. the oldest microtask, so microtasks enqueued by microtasks drain
    ///    before anything else;
    /// 2. otherwise the earliest due timer (ties in arrival order);
    /// 3. otherwise the oldest low-priority task.
    ///
    /// When nothing is ready but timers are pending, the clock is waited on
    /// until the earliest one is due.
    ///
    /// With `halt_on_task_failure` set, the first failure stops the drain and
    /// is returned; whatever is still queued stays queued for a later call.
    pub fn drain(&self) -> Result<DrainReport, SchedulerError> {
        let _guard = DrainGuard::enter(&self.draining)?;
        let mut report = DrainReport::default();

        tracing::debug!(
            microtasks = self.pending_microtasks(),
            timers = self.pending_timers(),
            low_priority = self.pending_low_priority(),
            "drain started"
        );

        loop {
            if let Some(queued) = self.next_ready() {
                report.record(queued.tier);
                if let Err(failure) = self.execute(queued) {
                    report.failures.push(self.handle_failure(failure)?);
                }
                continue;
            }

            let Some(due) = self.next_timer_due() else {
                break;
            };
            tracing::debug!(now = ?self.clock.now(), ?due, "waiting for next timer");
            self.clock.wait_until(due);
            report.clock_waits += 1;
        }

        tracing::debug!(
            executed = report.executed(),
            failures = report.failures.len(),
            "drain finished"
        );
        Ok(report)
    }

    /// Run at most one ready task without waiting on the clock.
    /// Returns whether any work, queued or pending, remains.
    pub fn tick(&self) -> Result<bool, SchedulerError> {
        let _guard = DrainGuard::enter(&self.draining)?;

        if let Some(queued) = self.next_ready() {
            if let Err(failure) = self.execute(queued) {
                self.handle_failure(failure)?;
            }
        }

        Ok(!self.is_idle())
    }

    pub fn is_idle(&self) -> bool {
        self.microtasks.is_empty() && self.low_priority.is_empty() && self.timers.borrow().is_empty()
    }

    pub fn pending_microtasks(&self) -> usize {
        self.microtasks.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn pending_low_priority(&self) -> usize {
        self.low_priority.len()
    }

    /// Clock reading at which the earliest pending timer becomes eligible.
    pub fn next_timer_due(&self) -> Option<Duration> {
        self.timers.borrow_mut().next_due()
    }

    fn accept(&self, tier: Tier, task: Task) -> QueuedTask {
        let seq = self.sequence.get();
        self.sequence.set(seq + 1);
        QueuedTask {
            id: TaskId(seq),
            tier,
            task,
        }
    }

    fn enqueue(&self, queue: &TaskQueue, tier: Tier, task: Task) -> TaskId {
        let queued = self.accept(tier, task);
        let id = queued.id;
        tracing::trace!(task = %id, %tier, label = ?queued.task.label(), "task queued");
        queue.push(queued);
        id
    }

    // Tie-break: microtask > due timer > low-priority task.
    fn next_ready(&self) -> Option<QueuedTask> {
        if let Some(task) = self.microtasks.pop() {
            return Some(task);
        }

        let now = self.clock.now();
        if let Some(entry) = self.timers.borrow_mut().pop_due(now) {
            return Some(entry.task);
        }

        self.low_priority.pop()
    }

    fn execute(&self, queued: QueuedTask) -> Result<(), TaskFailure> {
        let QueuedTask { id, tier, task } = queued;
        let (label, run) = task.into_parts();
        tracing::trace!(task = %id, %tier, ?label, "running task");

        run().map_err(|source| TaskFailure {
            task: id,
            label,
            tier,
            source,
        })
    }

    // Hands the failure back for the caller to keep when not halting.
    fn handle_failure(&self, failure: TaskFailure) -> Result<TaskFailure, SchedulerError> {
        if self.config.halt_on_task_failure {
            return Err(failure.into());
        }

        tracing::error!(
            task = %failure.task,
            tier = %failure.tier,
            label = ?failure.label,
            error = %failure.source,
            "task failed, continuing"
        );
        Ok(failure)
    }
}

impl<C: Clock> Scheduler for LocalScheduler<C> {
    fn schedule_microtask(&self, task: impl Into<Task>) -> TaskId {
        self.enqueue(&self.microtasks, Tier::Microtask, task.into())
    }

    fn schedule_timer(&self, task: impl Into<Task>, delay: Duration) -> TimerId {
        let queued = self.accept(Tier::Timer, task.into());
        let task_id = queued.id;
        let now = self.clock.now();
        let timer = self.timers.borrow_mut().insert(queued, delay, now);
        tracing::trace!(task = %task_id, ?timer, ?delay, "timer scheduled");
        timer
    }

    fn cancel_timer(&self, timer: TimerId) -> bool {
        let cancelled = self.timers.borrow_mut().cancel(timer).is_some();
        tracing::trace!(?timer, cancelled, "timer cancel requested");
        cancelled
    }

    fn schedule_low_priority(&self, task: impl Into<Task>) -> TaskId {
        self.enqueue(&self.low_priority, Tier::LowPriority, task.into())
    }

    fn now(&self) -> Duration {
        self.clock.now()
    }
}

/// Marks the scheduler as draining; rejects nested drains.
struct DrainGuard<'a>(&'a Cell<bool>);

impl<'a> DrainGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Result<Self, SchedulerError> {
        if flag.replace(true) {
            return Err(SchedulerError::Reentrant);
        }
        Ok(Self(flag))
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
