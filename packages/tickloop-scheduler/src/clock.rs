//! Monotonic time sources consulted by the scheduler on every drain step.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonic clock measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;

    /// Block (or jump) until `now() >= deadline`.
    /// Called by `drain` when only future timers remain.
    fn wait_until(&self, deadline: Duration);
}

/// Virtual time that moves only when told to.
///
/// Clones share the same reading, so a test can keep a handle and advance
/// time while the scheduler owns another.
#[derive(Debug, Clone, Default)]
pub struct LogicalClock {
    now: Rc<Cell<Duration>>,
}

impl LogicalClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }

    /// Move forward to `instant`. Never moves backwards.
    pub fn advance_to(&self, instant: Duration) {
        if instant > self.now.get() {
            self.now.set(instant);
        }
    }
}

impl Clock for LogicalClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn wait_until(&self, deadline: Duration) {
        self.advance_to(deadline);
    }
}

/// Wall-clock time backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wait_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}
