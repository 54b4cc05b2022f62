use anyhow::{Context, Result};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tickloop_scheduler::{Chain, LocalScheduler, Scheduler, SchedulerConfig, Task};
use tracing::info;

/// What the program below prints on a conforming scheduler.
pub const EXPECTED: [u32; 7] = [1, 7, 3, 4, 5, 2, 6];

/// Sync print, zero-delay timer, microtask, two chained microtasks,
/// low-priority task, sync print. Returns the numbers in the order printed.
pub fn run(continue_on_failure: bool) -> Result<Vec<u32>> {
    let config = SchedulerConfig::new().halt_on_task_failure(!continue_on_failure);
    let scheduler = Rc::new(LocalScheduler::with_config(config));
    let output = Rc::new(RefCell::new(Vec::new()));

    let print = |n: u32| {
        let output = output.clone();
        Task::new(move || output.borrow_mut().push(n)).named(format!("print {n}"))
    };

    scheduler.run_synchronous(print(1))?;
    scheduler.schedule_timer(print(2), Duration::ZERO);
    scheduler.schedule_microtask(print(3));
    Chain::new().then(print(4)).then(print(5)).schedule(&scheduler);
    scheduler.schedule_low_priority(print(6));
    scheduler.run_synchronous(print(7))?;

    let report = scheduler.drain().context("draining ordering program")?;
    info!(
        microtasks = report.microtasks,
        timers = report.timers,
        low_priority = report.low_priority,
        "ordering program drained"
    );

    Ok(output.take())
}

pub fn render(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_expected_order() {
        assert_eq!(run(false).unwrap(), EXPECTED);
        assert_eq!(run(true).unwrap(), EXPECTED);
    }

    #[test]
    fn renders_comma_separated() {
        assert_eq!(render(&EXPECTED), "1, 7, 3, 4, 5, 2, 6");
        assert_eq!(render(&[]), "");
    }
}
