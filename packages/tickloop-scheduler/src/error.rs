use crate::task::{BoxError, TaskId, Tier};
use std::borrow::Cow;
use thiserror::Error;

/// A task returned an error while running.
#[derive(Debug, Error)]
#[error("{tier} task {task} ({}) failed", .label.as_deref().unwrap_or("unnamed"))]
pub struct TaskFailure {
    pub task: TaskId,
    pub label: Option<Cow<'static, str>>,
    pub tier: Tier,
    #[source]
    pub source: BoxError,
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    TaskFailure(#[from] TaskFailure),

    #[error("scheduler is already draining; drain and tick cannot be called from a running task")]
    Reentrant,
}

impl SchedulerError {
    pub fn task_failure(&self) -> Option<&TaskFailure> {
        match self {
            SchedulerError::TaskFailure(failure) => Some(failure),
            SchedulerError::Reentrant => None,
        }
    }
}
