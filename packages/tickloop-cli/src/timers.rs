use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tickloop_scheduler::{
    Clock, LocalScheduler, LogicalClock, Scheduler, SchedulerConfig, SystemClock, Task,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub delay: Duration,
    pub fired_at: Duration,
}

pub fn run(delays_ms: &[u64], realtime: bool) -> Result<Vec<Firing>> {
    if realtime {
        run_with(SystemClock::new(), delays_ms)
    } else {
        run_with(LogicalClock::new(), delays_ms)
    }
}

fn run_with<C: Clock + Clone + 'static>(clock: C, delays_ms: &[u64]) -> Result<Vec<Firing>> {
    let scheduler = LocalScheduler::with_clock(SchedulerConfig::default(), clock.clone());
    let firings = Rc::new(RefCell::new(Vec::with_capacity(delays_ms.len())));

    for &ms in delays_ms {
        let delay = Duration::from_millis(ms);
        let firings = firings.clone();
        let clock = clock.clone();
        let task = Task::new(move || {
            firings.borrow_mut().push(Firing {
                delay,
                fired_at: clock.now(),
            })
        });
        scheduler.schedule_timer(task.named(format!("timer {ms}ms")), delay);
    }

    let report = scheduler.drain()?;
    debug!(
        timers = report.timers,
        clock_waits = report.clock_waits,
        "timers drained"
    );

    Ok(firings.take())
}
