use crate::context::{Request, ResponseHandle};
use crate::dispatcher::{Dispatcher, HandlerList};

/// Top-level handler chain bound to its dispatcher.
///
/// This is the seam a transport plugs into: hand every parsed request to
/// [`App::handle`], drive the scheduler, and write the response once
/// [`ResponseHandle::is_ended`] reports true.
#[derive(Clone)]
pub struct App {
    dispatcher: Dispatcher,
    handlers: HandlerList,
}

impl App {
    pub fn new(dispatcher: Dispatcher, handlers: impl Into<HandlerList>) -> Self {
        Self {
            dispatcher,
            handlers: handlers.into(),
        }
    }

    /// Start handling `request`
    ///
    /// Returns the shared response handle right away; handlers only run when
    /// the scheduler is driven.
    pub fn handle(&self, request: Request) -> ResponseHandle {
        self.dispatcher
            .dispatch_request(request, std::rc::Rc::clone(&self.handlers))
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}
