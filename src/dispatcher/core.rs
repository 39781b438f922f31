//! Dispatcher core module - hot path for chain traversal.

use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;

use super::execute::execute;
use super::handler::{HandlerList, SharedHandler};
use crate::context::{Context, Exchange, Payload, Request, ResponseHandle};
use crate::runtime_config::RuntimeConfig;
use crate::scheduler::Scheduler;
use crate::server::{
    ErrorResponder, FailureHandler, JsonEmitter, NotFound, ResponseEmitter, TerminalHandler,
};

/// Collaborators shared by every chain of an application.
///
/// The dispatcher schedules steps, decides what happens when a top-level chain
/// runs out of handlers, renders failures and serializes handler values. It
/// holds no per-request state; cloning is four `Rc` increments.
#[derive(Clone)]
pub struct Dispatcher {
    scheduler: Rc<dyn Scheduler>,
    terminal: Rc<dyn TerminalHandler>,
    failure: Rc<dyn FailureHandler>,
    emitter: Rc<dyn ResponseEmitter>,
}

impl Dispatcher {
    /// Create a dispatcher with the default collaborators
    ///
    /// [`NotFound`] as terminal handler, a non-production [`ErrorResponder`] as
    /// failure handler and [`JsonEmitter`] as response emitter.
    pub fn new(scheduler: impl Scheduler + 'static) -> Self {
        Self {
            scheduler: Rc::new(scheduler),
            terminal: Rc::new(NotFound),
            failure: Rc::new(ErrorResponder::default()),
            emitter: Rc::new(JsonEmitter),
        }
    }

    /// Create a dispatcher whose failure handler follows `config.production`
    pub fn from_config(scheduler: impl Scheduler + 'static, config: &RuntimeConfig) -> Self {
        Self::new(scheduler).with_failure(ErrorResponder::new(config.production))
    }

    #[must_use]
    pub fn with_terminal(mut self, terminal: impl TerminalHandler + 'static) -> Self {
        self.terminal = Rc::new(terminal);
        self
    }

    #[must_use]
    pub fn with_failure(mut self, failure: impl FailureHandler + 'static) -> Self {
        self.failure = Rc::new(failure);
        self
    }

    #[must_use]
    pub fn with_emitter(mut self, emitter: impl ResponseEmitter + 'static) -> Self {
        self.emitter = Rc::new(emitter);
        self
    }

    #[must_use]
    pub fn scheduler(&self) -> &dyn Scheduler {
        self.scheduler.as_ref()
    }

    #[must_use]
    pub fn failure(&self) -> &dyn FailureHandler {
        self.failure.as_ref()
    }

    #[must_use]
    pub fn emitter(&self) -> &dyn ResponseEmitter {
        self.emitter.as_ref()
    }

    /// Start a chain over `handlers`
    ///
    /// When `top_level` is set, running out of handlers schedules the terminal
    /// handler. A nested chain (a route's handlers) simply stops: the response
    /// is then up to whatever embedded it.
    #[must_use]
    pub fn chain(&self, top_level: bool, handlers: HandlerList) -> Dispatch {
        Dispatch::new(
            self.clone(),
            Cursor::Chain {
                handlers,
                index: Cell::new(0),
                top_level,
            },
        )
    }

    /// One-shot dispatch for a single handler
    ///
    /// The first advance schedules the handler; later advances do nothing,
    /// exactly like a nested chain that ran out of handlers.
    #[must_use]
    pub fn single(&self, handler: SharedHandler) -> Dispatch {
        Dispatch::new(
            self.clone(),
            Cursor::Single {
                handler,
                fired: Cell::new(false),
            },
        )
    }

    /// Run `request` through a top-level chain over `handlers`
    ///
    /// Returns the response handle immediately. Nothing runs until the
    /// scheduler is driven.
    pub fn dispatch_request(&self, request: Request, handlers: HandlerList) -> ResponseHandle {
        let exchange = Exchange::new(request);
        let response = exchange.response().clone();
        let ctx = Context::new(exchange, self.clone());

        debug!(
            request_id = %ctx.request_id(),
            method = %ctx.request().method,
            path = %ctx.request().path,
            chain_len = handlers.len(),
            "Request dispatch start"
        );

        self.chain(true, handlers).advance(&ctx, None);
        response
    }

    fn schedule_terminal(&self, ctx: &Context) {
        let terminal = Rc::clone(&self.terminal);
        let failure = Rc::clone(&self.failure);
        let ctx = ctx.clone();
        self.scheduler.defer(Box::pin(async move {
            if ctx.exchange().has_failed() {
                debug!(
                    request_id = %ctx.request_id(),
                    "Request already failed, terminal handler skipped"
                );
                return;
            }
            terminal.exhausted(&ctx, failure.as_ref());
        }));
    }
}

enum Cursor {
    Chain {
        handlers: HandlerList,
        index: Cell<usize>,
        top_level: bool,
    },
    Single {
        handler: SharedHandler,
        fired: Cell<bool>,
    },
}

enum Advance {
    Run { handler: SharedHandler, index: usize },
    Exhausted { top_level: bool },
}

impl Cursor {
    fn take(&self) -> Advance {
        match self {
            Cursor::Chain {
                handlers,
                index,
                top_level,
            } => {
                let i = index.get();
                match handlers.get(i) {
                    Some(handler) => {
                        index.set(i + 1);
                        Advance::Run {
                            handler: Rc::clone(handler),
                            index: i,
                        }
                    }
                    None => Advance::Exhausted {
                        top_level: *top_level,
                    },
                }
            }
            Cursor::Single { handler, fired } => {
                if fired.replace(true) {
                    Advance::Exhausted { top_level: false }
                } else {
                    Advance::Run {
                        handler: Rc::clone(handler),
                        index: 0,
                    }
                }
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            Cursor::Chain { handlers, .. } => handlers.len(),
            Cursor::Single { .. } => 1,
        }
    }

    fn position(&self) -> usize {
        match self {
            Cursor::Chain { index, .. } => index.get(),
            Cursor::Single { fired, .. } => usize::from(fired.get()),
        }
    }
}

/// Cursor over one request's traversal of one chain.
///
/// Created per request (never shared between requests, even when they run the
/// same route). Clones share the cursor.
#[derive(Clone)]
pub struct Dispatch {
    inner: Rc<DispatchInner>,
}

struct DispatchInner {
    dispatcher: Dispatcher,
    cursor: Cursor,
}

impl Dispatch {
    fn new(dispatcher: Dispatcher, cursor: Cursor) -> Self {
        Self {
            inner: Rc::new(DispatchInner { dispatcher, cursor }),
        }
    }

    /// Schedule the next handler with a context derived from `ctx`
    ///
    /// When the chain is exhausted, a top-level chain schedules the terminal
    /// handler and a nested chain does nothing.
    pub fn advance(&self, ctx: &Context, payload: Option<Payload>) {
        let dispatcher = &self.inner.dispatcher;
        match self.inner.cursor.take() {
            Advance::Run { handler, index } => {
                debug!(
                    request_id = %ctx.request_id(),
                    step = index,
                    chain_len = self.inner.cursor.len(),
                    "Scheduling handler step"
                );
                let step_ctx = ctx.bind(self.clone(), index);
                dispatcher
                    .scheduler()
                    .defer(Box::pin(execute(step_ctx, handler, payload)));
            }
            Advance::Exhausted { top_level: true } => {
                debug!(
                    request_id = %ctx.request_id(),
                    "Top-level chain exhausted, scheduling terminal handler"
                );
                dispatcher.schedule_terminal(ctx);
            }
            Advance::Exhausted { top_level: false } => {
                debug!(
                    request_id = %ctx.request_id(),
                    "Nested chain exhausted"
                );
            }
        }
    }

    /// Number of handlers already scheduled
    #[must_use]
    pub fn position(&self) -> usize {
        self.inner.cursor.position()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.cursor.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.position() >= self.len()
    }
}
