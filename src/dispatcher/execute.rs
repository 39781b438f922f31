use futures::FutureExt;
use http::StatusCode;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{trace, warn};

use super::handler::{Reply, SharedHandler};
use crate::context::{Context, Payload};
use crate::error::ChainError;

/// Run one handler step and act on its outcome.
///
/// Skips the handler when the response already ended or the request already
/// failed. Panics raised while calling or polling the handler are turned into
/// failures like any `Err`. A step that failed through `panic` produces no
/// other outcome: its returned value and any held `next` are dropped.
pub(crate) async fn execute(
    ctx: Context,
    handler: SharedHandler,
    payload: Option<Payload>,
) {
    if ctx.response().is_ended() {
        trace!(
            request_id = %ctx.request_id(),
            step = ctx.step_index(),
            "Response already ended, skipping step"
        );
        return;
    }
    if ctx.exchange().has_failed() {
        trace!(
            request_id = %ctx.request_id(),
            step = ctx.step_index(),
            "Request already failed, skipping step"
        );
        return;
    }

    let outcome = match catch_unwind(AssertUnwindSafe(|| handler.call(ctx.clone(), payload))) {
        Ok(fut) => AssertUnwindSafe(fut)
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(panic_error(panic))),
        Err(panic) => Err(panic_error(panic)),
    };

    let held = ctx.settle();

    if ctx.exchange().has_failed() {
        match outcome {
            Err(err) => ctx.fail(ChainError::HandlerThrown(err)),
            Ok(reply) if held.is_some() || !matches!(reply, Reply::Pass) => warn!(
                request_id = %ctx.request_id(),
                step = ctx.step_index(),
                "Handler failed the request; returned value and next ignored"
            ),
            Ok(_) => {}
        }
        return;
    }

    match outcome {
        Ok(Reply::Pass) => {
            if let Some(payload) = held {
                ctx.release(payload);
            }
        }
        Ok(reply) => {
            if held.is_some() {
                warn!(
                    request_id = %ctx.request_id(),
                    step = ctx.step_index(),
                    "Handler returned a value after calling next; next ignored"
                );
            }
            let emitter = ctx.dispatcher().emitter();
            match reply {
                Reply::NoContent => emitter.empty(&ctx, StatusCode::NO_CONTENT),
                Reply::Body(value) => emitter.send(&ctx, ctx.response().status(), value),
                Reply::Pass => {}
            }
        }
        Err(err) => ctx.fail(ChainError::HandlerThrown(err)),
    }
}

fn panic_error(panic: Box<dyn Any + Send>) -> anyhow::Error {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    anyhow::anyhow!("handler panicked: {message}")
}
