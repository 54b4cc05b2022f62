use std::borrow::Cow;
use std::fmt;

/// Error type a fallible task may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type TaskResult = Result<(), BoxError>;

/// Identity the scheduler assigns to a task when it is scheduled or run.
///
/// Ids are taken from a single per-scheduler sequence, so they also record
/// arrival order across all tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl TaskId {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The queue a task originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Run directly by the caller, never queued.
    Synchronous,
    Microtask,
    Timer,
    LowPriority,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Synchronous => "synchronous",
            Tier::Microtask => "microtask",
            Tier::Timer => "timer",
            Tier::LowPriority => "low-priority",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A one-shot unit of work.
///
/// Any `FnOnce() + 'static` converts into an infallible task; use
/// [`Task::fallible`] when the work can fail.
pub struct Task {
    label: Option<Cow<'static, str>>,
    run: Box<dyn FnOnce() -> TaskResult>,
}

impl Task {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self::fallible(move || {
            f();
            Ok(())
        })
    }

    pub fn fallible(f: impl FnOnce() -> TaskResult + 'static) -> Self {
        Self {
            label: None,
            run: Box::new(f),
        }
    }

    /// Attach a label that shows up in logs and failures.
    pub fn named(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Run `next` after this task succeeds. Nothing runs after a failure.
    pub(crate) fn and_then(self, next: impl FnOnce() + 'static) -> Self {
        let Task { label, run } = self;
        Self {
            label,
            run: Box::new(move || {
                run()?;
                next();
                Ok(())
            }),
        }
    }

    pub(crate) fn into_parts(self) -> (Option<Cow<'static, str>>, Box<dyn FnOnce() -> TaskResult>) {
        (self.label, self.run)
    }
}

impl<F> From<F> for Task
where
    F: FnOnce() + 'static,
{
    fn from(f: F) -> Self {
        Task::new(f)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("label", &self.label).finish_non_exhaustive()
    }
}
