use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tickloop_scheduler::{
    Clock, LocalScheduler, LogicalClock, Scheduler, SchedulerConfig, SystemClock,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn equal_delays_fire_in_scheduling_order() {
    let scheduler = LocalScheduler::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    for i in 0..8 {
        let log = log.clone();
        scheduler.schedule_timer(move || log.borrow_mut().push(i), ms(5));
    }

    scheduler.drain().unwrap();
    assert_eq!(*log.borrow(), (0..8).collect::<Vec<_>>());
}

#[test]
fn shorter_delays_fire_first_and_clock_follows() {
    let clock = LogicalClock::new();
    let scheduler = LocalScheduler::with_clock(SchedulerConfig::default(), clock.clone());
    let log = Rc::new(RefCell::new(Vec::new()));

    for delay in [30, 0, 10, 20] {
        let log = log.clone();
        let clock = clock.clone();
        scheduler.schedule_timer(
            move || log.borrow_mut().push((delay, clock.now())),
            ms(delay),
        );
    }

    let report = scheduler.drain().unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            (0, ms(0)),
            (10, ms(10)),
            (20, ms(20)),
            (30, ms(30)),
        ]
    );
    assert_eq!(report.clock_waits, 3);
    assert_eq!(clock.now(), ms(30));
}

#[test]
fn due_time_is_relative_to_scheduling_time() {
    let clock = LogicalClock::new();
    let scheduler = LocalScheduler::with_clock(SchedulerConfig::default(), clock.clone());
    let log = Rc::new(RefCell::new(Vec::new()));

    let l = log.clone();
    scheduler.schedule_timer(move || l.borrow_mut().push("early, long"), ms(10));

    clock.advance(ms(8));
    let l = log.clone();
    scheduler.schedule_timer(move || l.borrow_mut().push("late, short"), ms(5));

    assert_eq!(scheduler.next_timer_due(), Some(ms(10)));
    scheduler.drain().unwrap();
    assert_eq!(*log.borrow(), vec!["early, long", "late, short"]);
    assert_eq!(clock.now(), ms(13));
}

#[test]
fn low_priority_runs_while_timers_are_not_yet_due() {
    let scheduler = LocalScheduler::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let l = log.clone();
    scheduler.schedule_timer(move || l.borrow_mut().push("timer"), ms(1));
    let l = log.clone();
    scheduler.schedule_low_priority(move || l.borrow_mut().push("low"));

    scheduler.drain().unwrap();
    assert_eq!(*log.borrow(), vec!["low", "timer"]);
}

#[test]
fn due_timers_run_before_low_priority() {
    let clock = LogicalClock::new();
    let scheduler = LocalScheduler::with_clock(SchedulerConfig::default(), clock.clone());
    let log = Rc::new(RefCell::new(Vec::new()));

    let l = log.clone();
    scheduler.schedule_low_priority(move || l.borrow_mut().push("low"));
    let l = log.clone();
    scheduler.schedule_timer(move || l.borrow_mut().push("timer"), ms(1));

    clock.advance(ms(1));
    scheduler.drain().unwrap();
    assert_eq!(*log.borrow(), vec!["timer", "low"]);
}

#[test]
fn cancelled_timer_never_runs() {
    let scheduler = LocalScheduler::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let l = log.clone();
    let doomed = scheduler.schedule_timer(move || l.borrow_mut().push("doomed"), ms(5));
    let l = log.clone();
    scheduler.schedule_timer(move || l.borrow_mut().push("kept"), ms(5));

    assert!(scheduler.cancel_timer(doomed));
    assert_eq!(scheduler.pending_timers(), 1);

    scheduler.drain().unwrap();
    assert_eq!(*log.borrow(), vec!["kept"]);
}

#[test]
fn cancel_is_idempotent() {
    let scheduler = LocalScheduler::new();

    let cancelled = scheduler.schedule_timer(|| {}, ms(1));
    assert!(scheduler.cancel_timer(cancelled));
    assert!(!scheduler.cancel_timer(cancelled));

    let executed = scheduler.schedule_timer(|| {}, ms(0));
    scheduler.drain().unwrap();
    assert!(!scheduler.cancel_timer(executed));
    assert!(!scheduler.cancel_timer(executed));
}

#[test]
fn running_timer_cancelling_itself_is_a_no_op() {
    let scheduler = Rc::new(LocalScheduler::new());
    let own_id = Rc::new(RefCell::new(None));
    let outcome = Rc::new(RefCell::new(None));

    let timer = {
        let sch = scheduler.clone();
        let own_id = own_id.clone();
        let outcome = outcome.clone();
        scheduler.schedule_timer(
            move || {
                let id = own_id.borrow().expect("id recorded before drain");
                *outcome.borrow_mut() = Some(sch.cancel_timer(id));
            },
            ms(0),
        )
    };
    *own_id.borrow_mut() = Some(timer);

    scheduler.drain().unwrap();
    assert_eq!(*outcome.borrow(), Some(false));
}

#[test]
fn timer_can_cancel_a_later_timer() {
    let scheduler = Rc::new(LocalScheduler::new());
    let log = Rc::new(RefCell::new(Vec::new()));

    let l = log.clone();
    let later = scheduler.schedule_timer(move || l.borrow_mut().push("later"), ms(20));

    let sch = scheduler.clone();
    let l = log.clone();
    scheduler.schedule_timer(
        move || {
            l.borrow_mut().push("canceller");
            sch.cancel_timer(later);
        },
        ms(10),
    );

    let report = scheduler.drain().unwrap();
    assert_eq!(*log.borrow(), vec!["canceller"]);
    assert_eq!(report.timers, 1);
    assert_eq!(scheduler.now(), ms(10));
}

#[test]
fn system_clock_drain_sleeps_until_due() {
    let scheduler = LocalScheduler::with_clock(SchedulerConfig::default(), SystemClock::new());
    let fired_at = Rc::new(RefCell::new(None));

    let f = fired_at.clone();
    let clock = *scheduler.clock();
    scheduler.schedule_timer(move || *f.borrow_mut() = Some(clock.now()), ms(15));

    scheduler.drain().unwrap();
    let fired_at = fired_at.borrow().expect("timer fired");
    assert!(fired_at >= ms(15));
}
