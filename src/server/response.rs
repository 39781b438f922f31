use http::header::{self, HeaderValue};
use http::StatusCode;
use serde_json::Value;
use tracing::{debug, error};

use crate::context::Context;

/// Turns handler values into bytes on the response.
///
/// Both methods must leave the response ended, and must do nothing when it
/// already is.
pub trait ResponseEmitter {
    /// Write `value` as the body with `status`
    fn send(&self, ctx: &Context, status: StatusCode, value: Value);
    /// Write an empty body with `status`
    fn empty(&self, ctx: &Context, status: StatusCode);
}

/// Default emitter: strings as `text/plain`, any other value as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEmitter;

impl ResponseEmitter for JsonEmitter {
    fn send(&self, ctx: &Context, status: StatusCode, value: Value) {
        let res = ctx.response();
        if res.is_ended() {
            debug!(request_id = %ctx.request_id(), "Response already ended, value dropped");
            return;
        }

        let (content_type, body) = match value {
            Value::String(s) => ("text/plain; charset=utf-8", s.into_bytes()),
            other => match serde_json::to_vec(&other) {
                Ok(bytes) => ("application/json", bytes),
                Err(e) => {
                    error!(request_id = %ctx.request_id(), error = %e, "Failed to serialize response body");
                    self.empty(ctx, StatusCode::INTERNAL_SERVER_ERROR);
                    return;
                }
            },
        };

        res.set_status(status);
        res.insert_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static(content_type),
        );
        res.insert_header(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        res.write(&body);
        res.end();
    }

    fn empty(&self, ctx: &Context, status: StatusCode) {
        let res = ctx.response();
        if res.is_ended() {
            return;
        }
        res.set_status(status);
        res.insert_header(header::CONTENT_LENGTH, HeaderValue::from(0usize));
        res.end();
    }
}
