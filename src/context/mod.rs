//! # Context Module
//!
//! Per-request state handed to every handler.
//!
//! - [`Exchange`] - the request, its shared [`ResponseHandle`], its id and the
//!   "failure handler already ran" flag. One per request.
//! - [`Context`] - a per-step view over the exchange with `next` / `panic` bound
//!   to the step's dispatch. Rebuilt for every step.
//! - [`Payload`] / [`Params`] - the value passed between handlers and the path
//!   parameters the router extracted.
//!
//! Everything here is single-threaded (`Rc`, `Cell`, `RefCell`): a request never
//! leaves the thread driving its scheduler.

mod core;
mod exchange;
mod payload;

pub use self::core::Context;
pub use exchange::{Exchange, QueryVec, Request, Response, ResponseHandle};
pub use payload::{Params, Payload, MAX_INLINE_PARAMS, WILDCARD_KEY};
