use futures::future::{self, LocalBoxFuture};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::rc::Rc;

use crate::context::{Context, Payload};

/// Future returned by [`Handler::call`].
pub type HandlerFuture = LocalBoxFuture<'static, anyhow::Result<Reply>>;

/// Handler shared between the route table and every dispatch that runs it.
pub type SharedHandler = Rc<dyn Handler>;

/// Ordered handler list of a chain.
pub type HandlerList = Rc<[SharedHandler]>;

/// One unit of request-processing logic in a chain.
///
/// Most handlers are closures wrapped with [`handler`] or [`handler_sync`];
/// implement the trait directly for handlers that carry state, like the router's
/// `Resolver`.
pub trait Handler: 'static {
    fn call(&self, ctx: Context, payload: Option<Payload>) -> HandlerFuture;
}

/// What a handler step produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Respond with this value and the context's current status
    Body(Value),
    /// Respond with an empty 204
    NoContent,
    /// Produce nothing: the handler called `next`, or completion is left to a
    /// later step
    Pass,
}

impl Reply {
    /// Serialize `value` into a body reply
    ///
    /// # Errors
    ///
    /// Fails when `value` cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> anyhow::Result<Self> {
        Ok(Reply::Body(serde_json::to_value(value)?))
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Body(Value::String(text.into()))
    }
}

/// Conversion from a handler's return value into a [`Reply`].
///
/// - `()` is [`Reply::Pass`]
/// - `Value::Null` is [`Reply::NoContent`]
/// - strings and other JSON values are [`Reply::Body`]
/// - `Err(e)` fails the step
pub trait IntoReply {
    /// # Errors
    ///
    /// Returns the handler's error when the return value was an `Err`.
    fn into_reply(self) -> anyhow::Result<Reply>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> anyhow::Result<Reply> {
        Ok(self)
    }
}

impl IntoReply for () {
    fn into_reply(self) -> anyhow::Result<Reply> {
        Ok(Reply::Pass)
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> anyhow::Result<Reply> {
        Ok(match self {
            Value::Null => Reply::NoContent,
            other => Reply::Body(other),
        })
    }
}

impl IntoReply for String {
    fn into_reply(self) -> anyhow::Result<Reply> {
        Ok(Reply::text(self))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> anyhow::Result<Reply> {
        Ok(Reply::text(self))
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<anyhow::Error>,
{
    fn into_reply(self) -> anyhow::Result<Reply> {
        self.map_err(Into::into)?.into_reply()
    }
}

struct FnHandler<F>(F);

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Context, Option<Payload>) -> Fut + 'static,
    Fut: Future + 'static,
    Fut::Output: IntoReply,
{
    fn call(&self, ctx: Context, payload: Option<Payload>) -> HandlerFuture {
        let fut = (self.0)(ctx, payload);
        Box::pin(async move { fut.await.into_reply() })
    }
}

struct SyncHandler<F>(F);

impl<F, R> Handler for SyncHandler<F>
where
    F: Fn(&Context, Option<Payload>) -> R + 'static,
    R: IntoReply,
{
    fn call(&self, ctx: Context, payload: Option<Payload>) -> HandlerFuture {
        Box::pin(future::ready((self.0)(&ctx, payload).into_reply()))
    }
}

/// Wrap an async closure as a chain handler
///
/// ```rust,ignore
/// let greet = handler(|ctx, _payload| async move {
///     format!("Hello {}", ctx.params().and_then(|p| p.get("name")).unwrap_or("world"))
/// });
/// ```
pub fn handler<F, Fut>(f: F) -> SharedHandler
where
    F: Fn(Context, Option<Payload>) -> Fut + 'static,
    Fut: Future + 'static,
    Fut::Output: IntoReply,
{
    Rc::new(FnHandler(f))
}

/// Wrap a synchronous closure as a chain handler
pub fn handler_sync<F, R>(f: F) -> SharedHandler
where
    F: Fn(&Context, Option<Payload>) -> R + 'static,
    R: IntoReply,
{
    Rc::new(SyncHandler(f))
}
