use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, error, warn};

use super::exchange::{Exchange, Request, ResponseHandle};
use super::payload::{Params, Payload};
use crate::dispatcher::{Dispatch, Dispatcher};
use crate::error::{ChainError, PanicArg};
use crate::ids::RequestId;

/// Per-step view of a request.
///
/// A fresh `Context` is built for every handler step. The request and response
/// handles are shared by every step of the request; `next` and `panic` are bound
/// to the dispatch that scheduled this step and to the context it was
/// dispatched with.
#[derive(Clone)]
pub struct Context {
    exchange: Rc<Exchange>,
    dispatcher: Dispatcher,
    params: Option<Rc<Params>>,
    step: Option<Rc<Step>>,
}

/// Binding of one handler step to its dispatch.
///
/// `next` issued while the handler is still running is held here until the
/// handler settles, so a handler cannot both produce a value and advance the
/// chain.
pub(crate) struct Step {
    dispatch: Dispatch,
    base: Context,
    index: usize,
    running: Cell<bool>,
    advanced: Cell<bool>,
    held: RefCell<Option<Option<Payload>>>,
}

impl Context {
    /// Root context of a request: no step binding, no params
    #[must_use]
    pub fn new(exchange: Rc<Exchange>, dispatcher: Dispatcher) -> Self {
        Self {
            exchange,
            dispatcher,
            params: None,
            step: None,
        }
    }

    #[must_use]
    pub fn request(&self) -> &Request {
        self.exchange.request()
    }

    #[must_use]
    pub fn response(&self) -> &ResponseHandle {
        self.exchange.response()
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.exchange.id()
    }

    #[must_use]
    pub fn exchange(&self) -> &Rc<Exchange> {
        &self.exchange
    }

    /// Collaborators of the chain this context belongs to
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Params of the route this step runs under, if any
    #[must_use]
    pub fn params(&self) -> Option<&Params> {
        self.params.as_deref()
    }

    /// Index of this step in its chain
    #[must_use]
    pub fn step_index(&self) -> Option<usize> {
        self.step.as_ref().map(|s| s.index)
    }

    /// Advance the chain without a payload
    pub fn next(&self) {
        self.advance(None);
    }

    /// Advance the chain, handing `payload` to the next handler
    pub fn next_with(&self, payload: Payload) {
        self.advance(Some(payload));
    }

    /// Terminate the chain through the failure handler
    ///
    /// Error values (`anyhow::Error`, `HttpError`) are passed through; anything
    /// else is reported as an invalid panic argument with a 500 status. A no-op
    /// once the response ended or the failure handler already ran.
    pub fn panic(&self, arg: impl Into<PanicArg>) {
        self.fail(ChainError::from(arg.into()));
    }

    pub(crate) fn fail(&self, error: ChainError) {
        if self.response().is_ended() {
            debug!(
                request_id = %self.request_id(),
                error = %error,
                "Failure after response ended ignored"
            );
            return;
        }
        if self.exchange.mark_failed() {
            debug!(
                request_id = %self.request_id(),
                error = %error,
                "Failure handler already ran for this request"
            );
            return;
        }

        error!(
            request_id = %self.request_id(),
            method = %self.request().method,
            path = %self.request().path,
            kind = error.kind(),
            status = error.status().as_u16(),
            error = %error,
            "Request chain failed"
        );
        self.dispatcher.failure().handle(self, &error);
    }

    /// Context for the step a dispatch is about to schedule
    pub(crate) fn bind(&self, dispatch: Dispatch, index: usize) -> Self {
        let step = Step {
            dispatch,
            base: self.clone(),
            index,
            running: Cell::new(true),
            advanced: Cell::new(false),
            held: RefCell::new(None),
        };
        Self {
            step: Some(Rc::new(step)),
            ..self.clone()
        }
    }

    /// Copy of this context carrying route params
    pub(crate) fn with_params(&self, params: Params) -> Self {
        Self {
            params: Some(Rc::new(params)),
            ..self.clone()
        }
    }

    /// Mark the step settled and take any `next` it issued while running
    pub(crate) fn settle(&self) -> Option<Option<Payload>> {
        let step = self.step.as_ref()?;
        step.running.set(false);
        step.held.borrow_mut().take()
    }

    /// Perform a `next` that was held until the step settled
    pub(crate) fn release(&self, payload: Option<Payload>) {
        if let Some(step) = &self.step {
            step.dispatch.advance(&step.base, payload);
        }
    }

    fn advance(&self, payload: Option<Payload>) {
        let Some(step) = &self.step else {
            debug!(
                request_id = %self.request_id(),
                "next called on a context outside of any chain step"
            );
            return;
        };

        if step.advanced.replace(true) {
            warn!(
                request_id = %self.request_id(),
                step = step.index,
                "next called more than once by the same step; ignoring"
            );
            return;
        }

        if step.running.get() {
            *step.held.borrow_mut() = Some(payload);
            return;
        }

        step.dispatch.advance(&step.base, payload);
    }
}
