use futures::task::{waker, ArcWake};
use parking_lot::Mutex;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use tracing::trace;

use super::{Scheduler, Task};

type ReadyQueue = Arc<Mutex<VecDeque<u64>>>;

/// Deterministic single-threaded executor.
///
/// Tasks are polled in FIFO order of readiness. A task that returns `Pending`
/// is parked until its waker fires, at which point it goes to the back of the
/// ready queue. Nothing runs until the owner calls [`TaskQueue::tick`] or
/// [`TaskQueue::run_until_idle`].
///
/// Cloning is cheap and every clone drives the same queue.
#[derive(Clone, Default)]
pub struct TaskQueue {
    inner: Rc<Inner>,
}

#[derive(Default)]
struct Inner {
    tasks: RefCell<HashMap<u64, Task>>,
    ready: ReadyQueue,
    next_id: Cell<u64>,
}

struct TaskWaker {
    id: u64,
    ready: ReadyQueue,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.ready.lock().push_back(arc_self.id);
    }
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task to the back of the ready queue and return its id
    pub fn spawn(&self, task: Task) -> u64 {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.tasks.borrow_mut().insert(id, task);
        self.inner.ready.lock().push_back(id);
        trace!(task_id = id, "Task queued");
        id
    }

    /// Poll the task at the front of the ready queue once
    ///
    /// # Returns
    ///
    /// `false` when no task was ready, `true` otherwise.
    pub fn tick(&self) -> bool {
        let next = self.inner.ready.lock().pop_front();
        let Some(id) = next else {
            return false;
        };

        // Taken out of the map so the task may spawn or wake others while polled.
        let task = self.inner.tasks.borrow_mut().remove(&id);
        let Some(mut task) = task else {
            // Stale wake for a task that already completed.
            return true;
        };

        let task_waker = waker(Arc::new(TaskWaker {
            id,
            ready: Arc::clone(&self.inner.ready),
        }));
        let mut cx = TaskContext::from_waker(&task_waker);

        match task.as_mut().poll(&mut cx) {
            Poll::Ready(()) => trace!(task_id = id, "Task completed"),
            Poll::Pending => {
                self.inner.tasks.borrow_mut().insert(id, task);
            }
        }
        true
    }

    /// Run ready tasks until none is left
    ///
    /// Tasks parked on an external event stay parked; call this again after
    /// the event fires.
    ///
    /// # Returns
    ///
    /// Number of polls performed.
    pub fn run_until_idle(&self) -> usize {
        let mut polls = 0;
        while self.tick() {
            polls += 1;
        }
        polls
    }

    /// Number of tasks that have not completed yet (ready or parked)
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    /// Whether no task is waiting to be polled
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.inner.ready.lock().is_empty()
    }
}

impl Scheduler for TaskQueue {
    fn defer(&self, task: Task) {
        self.spawn(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::FutureExt;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_for_task = Rc::clone(&log);
        let make = move |label: &'static str| -> Task {
            let log = Rc::clone(&log_for_task);
            async move { log.borrow_mut().push(label) }.boxed_local()
        };
        (log, make)
    }

    #[test]
    fn test_defer_does_not_run_inline() {
        let queue = TaskQueue::new();
        let (log, make) = recorder();
        queue.defer(make("a"));
        assert!(log.borrow().is_empty());
        assert_eq!(queue.pending(), 1);
        queue.run_until_idle();
        assert_eq!(*log.borrow(), vec!["a"]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_tasks_run_in_fifo_order() {
        let queue = TaskQueue::new();
        let (log, make) = recorder();
        queue.defer(make("a"));
        queue.defer(make("b"));
        queue.defer(make("c"));
        assert_eq!(queue.run_until_idle(), 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_task_spawned_during_poll_runs_after_current_queue() {
        let queue = TaskQueue::new();
        let (log, make) = recorder();
        let inner_queue = queue.clone();
        let spawn_c = make("c");
        let first = make("a");
        queue.defer(
            async move {
                first.await;
                inner_queue.defer(spawn_c);
            }
            .boxed_local(),
        );
        queue.defer(make("b"));
        queue.run_until_idle();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parked_task_resumes_when_woken() {
        let queue = TaskQueue::new();
        let (tx, rx) = oneshot::channel::<u32>();
        let seen = Rc::new(Cell::new(0));
        let seen_in_task = Rc::clone(&seen);
        queue.defer(
            async move {
                let value = rx.await.unwrap_or_default();
                seen_in_task.set(value);
            }
            .boxed_local(),
        );

        queue.run_until_idle();
        assert_eq!(seen.get(), 0);
        assert_eq!(queue.pending(), 1);
        assert!(queue.is_idle());

        tx.send(7).unwrap();
        assert!(!queue.is_idle());
        queue.run_until_idle();
        assert_eq!(seen.get(), 7);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_tick_on_empty_queue() {
        let queue = TaskQueue::new();
        assert!(!queue.tick());
        assert_eq!(queue.run_until_idle(), 0);
    }
}
