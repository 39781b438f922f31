//! # chainrouter
//!
//! **chainrouter** runs HTTP requests through ordered chains of handlers and
//! routes them with first-match path patterns, on a single-threaded
//! cooperative scheduler.
//!
//! ## Overview
//!
//! An application is a top-level chain of handlers. Each handler either
//! produces the response, hands control to the next handler with
//! [`Context::next`], or fails. A router is just another handler: it matches the
//! request against its compiled routes and runs the matched route's own handler
//! list as a nested chain.
//!
//! ## Architecture
//!
//! - **[`dispatcher`]** - chain traversal: cursors, step execution, handler
//!   outcomes
//! - **[`context`]** - per-step [`Context`], shared request/response handles,
//!   payloads and route params
//! - **[`router`]** - route declaration, template compilation and resolution
//! - **[`scheduler`]** - the [`Scheduler`] seam and its [`TaskQueue`] and
//!   [`LocalSetScheduler`] implementations
//! - **[`server`]** - response emitter, terminal and failure handlers, [`App`]
//! - **[`middleware`]** - stock handlers such as [`middleware::trace_requests`]
//! - **[`error`]** - [`HttpError`], [`ChainError`] and [`RouteError`]
//! - **[`logging`]** / **[`runtime_config`]** - tracing setup and configuration
//! - **[`cli`]** - the `chainrouter-demo` binary
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant T as Transport
//!     participant A as App
//!     participant D as Dispatch
//!     participant S as Scheduler
//!     participant R as Resolver
//!     participant H as Route handlers
//!
//!     T->>A: handle(request)
//!     A->>D: chain(top_level).advance
//!     D->>S: defer(step 0)
//!     S->>R: call(ctx, payload)
//!     alt route matched
//!         R->>D: chain(nested).advance(route ctx, payload + params)
//!         D->>S: defer(route step 0)
//!         S->>H: call
//!         H-->>T: value written to the response
//!     else no match
//!         R->>D: ctx.next(payload)
//!         D->>S: defer(terminal handler)
//!         S-->>T: 404
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chainrouter::{get, handler_sync, router, App, Dispatcher, Request, TaskQueue};
//! use http::Method;
//!
//! let hello = handler_sync(|ctx, _| {
//!     format!("Hello {}", ctx.params().and_then(|p| p.get("name")).unwrap_or("world"))
//! });
//! let resolver = router(None).route(get("/hello/:name?", vec![hello])).mount(None)?;
//!
//! let queue = TaskQueue::new();
//! let app = App::new(Dispatcher::new(queue.clone()), vec![resolver.into_handler()]);
//!
//! let response = app.handle(Request::new(Method::GET, "/hello/ada")?);
//! queue.run_until_idle();
//! assert_eq!(response.body_text(), "Hello ada");
//! ```
//!
//! ## Handler outcomes
//!
//! | returned            | effect                                           |
//! |---------------------|--------------------------------------------------|
//! | `()` / `Reply::Pass`| nothing; the chain moves on only if `next` ran   |
//! | `Value::Null`       | empty 204                                        |
//! | string              | `text/plain` body with the current status        |
//! | other JSON value    | `application/json` body with the current status  |
//! | `Err(_)` / panic    | failure handler, once per request                |

pub mod cli;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod scheduler;
pub mod server;

pub use context::{Context, Params, Payload, Request, ResponseHandle};
pub use dispatcher::{
    handler, handler_sync, Dispatch, Dispatcher, Handler, HandlerFuture, HandlerList, IntoReply,
    Reply, SharedHandler,
};
pub use error::{ChainError, HttpError, PanicArg, RouteError};
pub use ids::RequestId;
pub use router::{
    del, get, head, options, patch, post, put, router, routes, Resolver, RouteEntity, Router,
};
pub use runtime_config::RuntimeConfig;
pub use scheduler::{LocalSetScheduler, Scheduler, TaskQueue};
pub use server::{
    App, ErrorResponder, FailureHandler, JsonEmitter, NotFound, ResponseEmitter, TerminalHandler,
};
