//! # CLI Module
//!
//! Command-line front end of the `chainrouter-demo` binary.
//!
//! ## Commands
//!
//! ### `run` (default)
//!
//! Mount the demo users API behind request tracing and push a fixed set of
//! sample requests through it:
//!
//! ```bash
//! chainrouter-demo run --log-level debug
//! ```
//!
//! ### `routes`
//!
//! Print the mounted route table:
//!
//! ```bash
//! chainrouter-demo routes
//! ```
//!
//! ### `request`
//!
//! Send a single request:
//!
//! ```bash
//! chainrouter-demo request -m POST /api/v1/users -b '{"name":"ada"}'
//! ```
//!
//! ## Global options
//!
//! - `--production` - empty bodies on failure (also `CHAINR_PRODUCTION=true`)
//! - `--log-level <LEVEL>` - overrides `CHAINR_LOG_LEVEL`
//! - `--config <FILE>` - TOML runtime configuration instead of the environment

mod commands;
mod demo;

#[cfg(test)]
mod tests;

pub use commands::{run, run_cli, send, Cli, Commands, Exchanged};
pub use demo::{demo_app, demo_router, sample_requests, User};
