//! Dependent steps that become ready one at a time.
//!
//! This is not a scheduler primitive: each step, once it has run, schedules
//! its successor as an ordinary microtask.

use crate::Scheduler;
use crate::task::{Task, TaskId};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

/// A sequence of steps where step `n + 1` is queued only after step `n`
/// succeeds, like `resolve().then(a).then(b)`.
///
/// A failing step ends the chain; the remaining steps are dropped unrun.
#[derive(Default)]
pub struct Chain {
    steps: VecDeque<Task>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: impl Into<Task>) -> Self {
        self.steps.push_back(step.into());
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Queue the first step as a microtask and return its id.
    ///
    /// Steps hold a weak handle to the scheduler, so a scheduler that is
    /// dropped undrained does not keep itself alive through its own chain.
    pub fn schedule<S: Scheduler + 'static>(self, scheduler: &Rc<S>) -> Option<TaskId> {
        enqueue_next(Rc::downgrade(scheduler), self.steps)
    }
}

fn enqueue_next<S: Scheduler + 'static>(scheduler: Weak<S>, mut steps: VecDeque<Task>) -> Option<TaskId> {
    let strong = scheduler.upgrade()?;
    let step = steps.pop_front()?;

    let step = if steps.is_empty() {
        step
    } else {
        step.and_then(move || {
            enqueue_next(scheduler, steps);
        })
    };

    Some(strong.schedule_microtask(step))
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("steps", &self.steps.len()).finish()
    }
}
