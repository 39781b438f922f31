//! Stock chain handlers that sit in front of application code.

mod tracing;

pub use self::tracing::{trace_requests, RequestTracer};
