use serde::{Deserialize, Serialize};

/// Behaviour knobs for [`LocalScheduler`](crate::LocalScheduler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Stop `drain` at the first failing task and return the failure.
    /// When unset, failures are logged, collected in the drain report, and
    /// draining continues.
    pub halt_on_task_failure: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            halt_on_task_failure: true,
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn halt_on_task_failure(mut self, halt: bool) -> Self {
        self.halt_on_task_failure = halt;
        self
    }
}
