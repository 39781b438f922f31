//! # Server Module
//!
//! Collaborators that turn chain outcomes into responses, and [`App`], the
//! entry point a transport hands requests to.
//!
//! - [`ResponseEmitter`] / [`JsonEmitter`] serialize handler values
//! - [`TerminalHandler`] / [`NotFound`] answer requests no handler took
//! - [`FailureHandler`] / [`ErrorResponder`] render failed chains
//!
//! Each trait is a seam on [`crate::Dispatcher`]; swap an implementation with
//! `Dispatcher::with_emitter`, `with_terminal` or `with_failure`.

mod app;
mod fallback;
mod response;

pub use app::App;
pub use fallback::{ErrorResponder, FailureHandler, NotFound, TerminalHandler};
pub use response::{JsonEmitter, ResponseEmitter};
