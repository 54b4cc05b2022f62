use crate::queue::QueuedTask;
use slotmap::{SlotMap, new_key_type};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

new_key_type! {
    /// Handle to a scheduled timer, used for cancellation.
    pub struct TimerId;
}

#[derive(Debug)]
pub struct TimerEntry {
    pub task: QueuedTask,
    pub delay: Duration,
    pub due: Duration,
}

// Heap order is (due, seq); seq is unique so `id` never decides a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Deadline {
    due: Duration,
    seq: u64,
    id: TimerId,
}

/// Pending timers ordered by due time, then by arrival.
///
/// Entries live in a slotmap so cancellation is O(1); the heap keeps stale
/// deadlines around until they reach the top and get skipped.
#[derive(Debug, Default)]
pub struct TimerSet {
    entries: SlotMap<TimerId, TimerEntry>,
    deadlines: BinaryHeap<Reverse<Deadline>>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, task: QueuedTask, delay: Duration, now: Duration) -> TimerId {
        let due = now.saturating_add(delay);
        let seq = task.id.sequence();
        let id = self.entries.insert(TimerEntry { task, delay, due });
        self.deadlines.push(Reverse(Deadline { due, seq, id }));
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> Option<TimerEntry> {
        self.entries.remove(id)
    }

    /// Due time of the earliest live timer.
    pub fn next_due(&mut self) -> Option<Duration> {
        self.purge_cancelled();
        self.deadlines.peek().map(|Reverse(d)| d.due)
    }

    /// Pop the earliest timer if it is due at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<TimerEntry> {
        self.purge_cancelled();
        let Reverse(next) = *self.deadlines.peek()?;
        if next.due > now {
            return None;
        }
        self.deadlines.pop();
        self.entries.remove(next.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn purge_cancelled(&mut self) {
        while let Some(Reverse(top)) = self.deadlines.peek() {
            if self.entries.contains_key(top.id) {
                break;
            }
            self.deadlines.pop();
        }
    }
}
