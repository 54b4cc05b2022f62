use crate::task::{Task, TaskId, Tier};
use std::cell::RefCell;
use std::collections::VecDeque;

/// A task that has been accepted by the scheduler.
#[derive(Debug)]
pub struct QueuedTask {
    pub id: TaskId,
    pub tier: Tier,
    pub task: Task,
}

/// A simple FIFO queue for tasks.
/// Since LocalScheduler is single-threaded, we use RefCell<VecDeque>.
#[derive(Debug, Default)]
pub struct TaskQueue {
    queue: RefCell<VecDeque<QueuedTask>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
        }
    }

    pub fn push(&self, task: QueuedTask) {
        self.queue.borrow_mut().push_back(task);
    }

    // The borrow ends before the caller runs the task, so the task itself
    // may push onto this queue.
    pub fn pop(&self) -> Option<QueuedTask> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }
}
