//! # Dispatcher Module
//!
//! The dispatcher steps one request through an ordered list of handlers.
//!
//! ## Overview
//!
//! - [`Dispatcher`] holds the collaborators every chain shares: the scheduler,
//!   the terminal ("not found") handler, the failure handler and the response
//!   emitter.
//! - [`Dispatch`] is the per-request cursor over one chain. It is created when a
//!   request enters a chain and dropped when the request is done with it.
//! - Execute Step runs one handler and interprets its [`Reply`].
//!
//! ## Request Flow
//!
//! 1. `Dispatcher::dispatch_request` builds the request's `Exchange` and root
//!    context, then advances a top-level chain
//! 2. `Dispatch::advance` takes the handler under the cursor, binds a fresh
//!    context to it and defers Execute Step on the scheduler
//! 3. The handler returns a value (the chain ends with a response), returns
//!    nothing after calling `next` (the chain advances) or fails (the chain ends
//!    through the failure handler)
//! 4. When a top-level chain runs out of handlers, the terminal handler runs
//!
//! ## Error Handling
//!
//! - `Err` results and Rust panics inside handlers become
//!   `ChainError::HandlerThrown`
//! - `Context::panic` becomes `ChainError::PanicInvoked` (or
//!   `InvalidPanicArgument` for a non-error argument)
//! - The failure handler runs at most once per request; later failures are
//!   ignored

mod core;
mod execute;
mod handler;

pub use self::core::{Dispatch, Dispatcher};
pub use handler::{
    handler, handler_sync, Handler, HandlerFuture, HandlerList, IntoReply, Reply, SharedHandler,
};
