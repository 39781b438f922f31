#![allow(dead_code)]

use chainrouter::{
    App, ChainError, Context, Dispatcher, ErrorResponder, FailureHandler, NotFound, Request,
    ResponseHandle, SharedHandler, TaskQueue, TerminalHandler,
};
use http::header::{self, HeaderValue};
use http::Method;
use serde_json::Value;
use std::cell::Cell;
use std::rc::Rc;

/// An [`App`] plus the queue driving it
pub struct TestServer {
    pub queue: TaskQueue,
    pub app: App,
    pub failures: Rc<Cell<usize>>,
    pub terminals: Rc<Cell<usize>>,
}

/// Failure handler that counts calls before rendering
pub struct CountingFailure {
    pub calls: Rc<Cell<usize>>,
    pub inner: ErrorResponder,
}

impl FailureHandler for CountingFailure {
    fn handle(&self, ctx: &Context, error: &ChainError) {
        self.calls.set(self.calls.get() + 1);
        self.inner.handle(ctx, error);
    }
}

/// Terminal handler that counts calls before answering 404
pub struct CountingTerminal {
    pub calls: Rc<Cell<usize>>,
}

impl TerminalHandler for CountingTerminal {
    fn exhausted(&self, ctx: &Context, failure: &dyn FailureHandler) {
        self.calls.set(self.calls.get() + 1);
        NotFound.exhausted(ctx, failure);
    }
}

/// Top-level chain over `handlers` with counting collaborators
pub fn server(handlers: Vec<SharedHandler>) -> TestServer {
    server_with(handlers, |d| d)
}

/// Like [`server`], with a hook to adjust the dispatcher
pub fn server_with(
    handlers: Vec<SharedHandler>,
    configure: impl FnOnce(Dispatcher) -> Dispatcher,
) -> TestServer {
    let queue = TaskQueue::new();
    let failures = Rc::new(Cell::new(0));
    let terminals = Rc::new(Cell::new(0));
    let dispatcher = Dispatcher::new(queue.clone())
        .with_failure(CountingFailure {
            calls: Rc::clone(&failures),
            inner: ErrorResponder::default(),
        })
        .with_terminal(CountingTerminal {
            calls: Rc::clone(&terminals),
        });
    TestServer {
        queue,
        app: App::new(configure(dispatcher), handlers),
        failures,
        terminals,
    }
}

impl TestServer {
    /// Start a request without driving the queue
    pub fn start(&self, method: Method, target: &str) -> ResponseHandle {
        self.app.handle(Request::new(method, target).unwrap())
    }

    /// Send a request and drive the queue until idle
    pub fn fetch(&self, method: Method, target: &str) -> ResponseHandle {
        let res = self.start(method, target);
        self.queue.run_until_idle();
        res
    }

    pub fn get(&self, target: &str) -> ResponseHandle {
        self.fetch(Method::GET, target)
    }

    /// Send a JSON body and drive the queue until idle
    pub fn send_json(&self, method: Method, target: &str, body: &str) -> ResponseHandle {
        let request = Request::new(method, target)
            .unwrap()
            .with_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .with_body(body.as_bytes().to_vec());
        let res = self.app.handle(request);
        self.queue.run_until_idle();
        res
    }
}

pub fn json_body(res: &ResponseHandle) -> Value {
    serde_json::from_slice(&res.body()).unwrap()
}

/// Counter bumped by a handler, to assert what ran
pub fn counter() -> Rc<Cell<usize>> {
    Rc::new(Cell::new(0))
}

pub fn bump(c: &Cell<usize>) {
    c.set(c.get() + 1);
}
