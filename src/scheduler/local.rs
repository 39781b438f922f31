use super::{Scheduler, Task};

/// Scheduler backed by the current tokio `LocalSet`.
///
/// Tasks are handed to `tokio::task::spawn_local`, so `defer` must be called
/// from inside `LocalSet::run_until` (or a task spawned on the set). Calling it
/// anywhere else makes tokio panic.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSetScheduler;

impl Scheduler for LocalSetScheduler {
    fn defer(&self, task: Task) {
        drop(tokio::task::spawn_local(task));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::cell::Cell;
    use std::rc::Rc;

    #[tokio::test]
    async fn test_deferred_task_runs_on_local_set() {
        let local = tokio::task::LocalSet::new();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);

        local
            .run_until(async move {
                LocalSetScheduler.defer(async move { flag.set(true) }.boxed_local());
                assert!(!ran.get());
                for _ in 0..8 {
                    tokio::task::yield_now().await;
                    if ran.get() {
                        break;
                    }
                }
                assert!(ran.get());
            })
            .await;
    }
}
