use http::StatusCode;
use serde_json::json;
use tracing::debug;

use crate::context::Context;
use crate::error::ChainError;

/// Runs when a top-level chain ran out of handlers.
pub trait TerminalHandler {
    fn exhausted(&self, ctx: &Context, failure: &dyn FailureHandler);
}

/// Renders a failed chain.
///
/// Called at most once per request, with the response not yet ended. Ending
/// the response is up to the implementation; either way no later handler or
/// terminal handler of the request runs.
pub trait FailureHandler {
    fn handle(&self, ctx: &Context, error: &ChainError);
}

/// Default terminal handler: an empty 404.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotFound;

impl TerminalHandler for NotFound {
    fn exhausted(&self, ctx: &Context, _failure: &dyn FailureHandler) {
        if ctx.response().is_ended() {
            return;
        }
        debug!(
            request_id = %ctx.request_id(),
            method = %ctx.request().method,
            path = %ctx.request().path,
            "No handler produced a response"
        );
        ctx.dispatcher().emitter().empty(ctx, StatusCode::NOT_FOUND);
    }
}

/// Default failure handler.
///
/// Renders `{"message": ...}` with the error's status. In production mode the
/// body is left empty so error details never reach the client.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorResponder {
    production: bool,
}

impl ErrorResponder {
    #[must_use]
    pub fn new(production: bool) -> Self {
        Self { production }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.production
    }
}

impl FailureHandler for ErrorResponder {
    fn handle(&self, ctx: &Context, error: &ChainError) {
        let status = error.status();
        let emitter = ctx.dispatcher().emitter();
        if self.production {
            emitter.empty(ctx, status);
            return;
        }

        let mut message = error.message();
        if message.is_empty() {
            message = "unknown".to_string();
        }
        emitter.send(ctx, status, json!({ "message": message }));
    }
}
