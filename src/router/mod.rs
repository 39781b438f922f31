//! # Router Module
//!
//! Path-pattern routing on top of the chain dispatcher.
//!
//! ## Overview
//!
//! - Declare routes with the verb builders ([`get`], [`post`], ...), group them
//!   with [`routes`] and collect them on a [`Router`]
//! - [`Router::mount`] compiles every template into a case-insensitive regex
//!   and returns a [`Resolver`]
//! - A [`Resolver`] is a chain handler: it matches the request, then runs the
//!   matched route's handlers as a nested chain, or calls `next` when nothing
//!   matched
//!
//! ## Template grammar
//!
//! `/literal`, `/:param`, `/:optional?`, `/*` (last segment only, captured as
//! `wild`). An optional segment may precede required ones: `/path/:foo?/:bar`
//! matches `/path/x` with only `bar` bound. Matching is case-insensitive, anchored and tolerates a
//! trailing slash; the query string is never part of the match.
//!
//! ## Example
//!
//! ```rust,ignore
//! use chainrouter::{get, handler_sync, router, routes};
//!
//! let show = handler_sync(|ctx, _| {
//!     format!("user {}", ctx.params().and_then(|p| p.get("id")).unwrap_or("?"))
//! });
//! let resolver = router(Some("/api"))
//!     .routes(routes(Some("/v1"), [get("/users/:id", vec![show])]))
//!     .mount(None)?;
//! resolver.dump_routes();
//! ```
//!
//! ## Performance
//!
//! Matching is a linear scan in registration order: O(n) in the number of
//! routes. First match wins, so registration order is part of the API.

mod compile;
mod core;
mod entity;
#[cfg(test)]
mod tests;

pub use self::core::{Resolver, RouteMatch};
pub use compile::{compile, CompiledPattern, CompiledRoute};
pub use entity::{del, get, head, options, patch, post, put, router, routes, RouteEntity, Router};
