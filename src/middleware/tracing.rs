use futures::future;
use std::rc::Rc;
use tracing::info;

use crate::context::{Context, Payload};
use crate::dispatcher::{Handler, HandlerFuture, Reply, SharedHandler};

/// Logs each request as it enters the chain, then calls `next`.
///
/// The incoming payload, if any, is forwarded untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestTracer;

impl Handler for RequestTracer {
    fn call(&self, ctx: Context, payload: Option<Payload>) -> HandlerFuture {
        let request = ctx.request();
        info!(
            request_id = %ctx.request_id(),
            method = %request.method,
            path = %request.path,
            query = request.query.as_deref().unwrap_or(""),
            "Request received"
        );
        match payload {
            Some(payload) => ctx.next_with(payload),
            None => ctx.next(),
        }
        Box::pin(future::ready(Ok(Reply::Pass)))
    }
}

/// [`RequestTracer`] as a chain handler
#[must_use]
pub fn trace_requests() -> SharedHandler {
    Rc::new(RequestTracer)
}
