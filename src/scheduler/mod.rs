//! # Scheduler Module
//!
//! Every handler step of a chain is deferred onto a [`Scheduler`] instead of being
//! called inline. This keeps the stack flat for long chains, stops a handler's
//! failure from unwinding through whoever called `next`, and lets independent
//! requests interleave on a single thread.
//!
//! ## Ordering guarantees
//!
//! - A deferred task never runs inside the call to [`Scheduler::defer`]
//! - For one request, steps run one at a time in registration order, because a
//!   step is only deferred once the previous one advanced the cursor
//! - Across requests there is no ordering: tasks from different requests
//!   interleave at every suspension point (step boundaries and any `.await`
//!   inside a handler)
//!
//! ## Implementations
//!
//! - [`TaskQueue`] - a deterministic FIFO executor driven explicitly with
//!   [`TaskQueue::tick`] / [`TaskQueue::run_until_idle`]. Tests use it to control
//!   interleaving exactly.
//! - [`LocalSetScheduler`] - defers onto `tokio::task::spawn_local`, for hosts that
//!   already run a tokio `LocalSet`.

mod local;
mod queue;

use futures::future::LocalBoxFuture;

pub use local::LocalSetScheduler;
pub use queue::TaskQueue;

/// A unit of deferred work: one handler step or one terminal callback.
pub type Task = LocalBoxFuture<'static, ()>;

/// Defers tasks to a later tick of a single-threaded cooperative loop.
pub trait Scheduler {
    /// Queue `task` to run after the current task yields.
    fn defer(&self, task: Task);
}
