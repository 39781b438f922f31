//! Router core module - hot path for request routing.

use futures::future;
use http::header::{self, HeaderValue};
use http::{Method, StatusCode};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::compile::CompiledRoute;
use crate::context::{Context, Params, Payload};
use crate::dispatcher::{Handler, HandlerFuture, Reply, SharedHandler};

/// Result of matching a request against the route table
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// The first route whose method and pattern matched
    pub route: &'a CompiledRoute,
    /// Parameters extracted from the path, in template order
    pub params: Params,
}

impl RouteMatch<'_> {
    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }
}

/// Compiled, immutable route table, usable as a chain handler.
///
/// Routes are tried in registration order and the first one whose method and
/// pattern both match wins. When nothing matches, the resolver calls `next` so
/// the enclosing chain carries on.
///
/// Cloning shares the table.
#[derive(Clone)]
pub struct Resolver {
    routes: Rc<[CompiledRoute]>,
}

impl Resolver {
    /// Wrap a compiled table
    ///
    /// Normally obtained from [`super::Router::mount`].
    #[must_use]
    pub fn new(routes: Rc<[CompiledRoute]>) -> Self {
        if routes.is_empty() {
            info!(routes_count = 0, "Routing table loaded with no routes");
        } else {
            let routes_summary: Vec<String> = routes
                .iter()
                .take(10)
                .map(|r| format!("{} {}", r.method, r.template))
                .collect();
            info!(
                routes_count = routes.len(),
                routes_summary = ?routes_summary,
                "Routing table loaded"
            );
        }
        Self { routes }
    }

    #[must_use]
    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// This resolver as a chain handler
    #[must_use]
    pub fn into_handler(self) -> SharedHandler {
        Rc::new(self)
    }

    /// Print all registered routes to stdout
    ///
    /// Useful for debugging and verifying that routes are mounted where you
    /// expect them.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for route in self.routes.iter() {
            println!(
                "[route] {} {} -> {} handler(s) {}",
                route.method,
                route.template,
                route.handlers.len(),
                route.pattern.as_str()
            );
        }
    }

    /// Full templates of every route, in match order
    #[must_use]
    pub fn path_patterns(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.template.clone()).collect()
    }

    /// First route whose method equals `method` and whose pattern matches
    /// `path`, with the params it captured
    ///
    /// `path` must not carry the query string.
    #[inline]
    fn find(&self, method: &Method, path: &str) -> Option<(&CompiledRoute, Params)> {
        self.routes.iter().find_map(|r| {
            if r.method != *method {
                return None;
            }
            r.pattern.captures(path).map(|params| (r, params))
        })
    }

    /// Match a request against the table without running anything
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// if let Some(m) = resolver.route(&Method::GET, "/users/123") {
    ///     assert_eq!(m.get("id"), Some("123"));
    /// }
    /// ```
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let match_start = Instant::now();
        let found = self.find(method, path);
        let match_duration = match_start.elapsed();

        let Some((route, params)) = found else {
            debug!(
                method = %method,
                path = %path,
                duration_us = match_duration.as_micros(),
                "No route matched"
            );
            return None;
        };

        if match_duration > Duration::from_millis(1) {
            warn!(
                method = %method,
                path = %path,
                route_pattern = %route.template,
                duration_us = match_duration.as_micros(),
                routes_count = self.routes.len(),
                "Slow route matching detected"
            );
        }

        Some(RouteMatch { route, params })
    }

    /// Route one request step
    ///
    /// A HEAD match short-circuits with an empty 200. A normal match starts
    /// the route's own chain under a context carrying the params; a miss hands
    /// the original payload to `next`.
    fn resolve(&self, ctx: &Context, payload: Option<Payload>) {
        let request = ctx.request();
        let Some((route, params)) = self.find(&request.method, &request.path) else {
            debug!(
                request_id = %ctx.request_id(),
                method = %request.method,
                path = %request.path,
                "No route matched, passing to next handler"
            );
            match payload {
                Some(payload) => ctx.next_with(payload),
                None => ctx.next(),
            }
            return;
        };

        if request.method == Method::HEAD {
            debug!(
                request_id = %ctx.request_id(),
                path = %request.path,
                route_pattern = %route.template,
                "HEAD route matched, answering without running handlers"
            );
            let res = ctx.response();
            res.set_status(StatusCode::OK);
            res.insert_header(header::CONTENT_LENGTH, HeaderValue::from(0usize));
            res.end();
            return;
        }

        info!(
            request_id = %ctx.request_id(),
            method = %request.method,
            path = %request.path,
            route_pattern = %route.template,
            path_params = ?params,
            handlers = route.handlers.len(),
            "Route matched"
        );

        let payload = payload.unwrap_or_default().merge_params(params.clone());
        let route_ctx = ctx.with_params(params);
        let dispatcher = ctx.dispatcher();

        let dispatch = if route.single() {
            match route.handlers.first() {
                Some(handler) => dispatcher.single(Rc::clone(handler)),
                None => return,
            }
        } else {
            dispatcher.chain(false, Rc::clone(&route.handlers))
        };
        dispatch.advance(&route_ctx, Some(payload));
    }
}

impl Handler for Resolver {
    fn call(&self, ctx: Context, payload: Option<Payload>) -> HandlerFuture {
        self.resolve(&ctx, payload);
        Box::pin(future::ready(Ok(Reply::Pass)))
    }
}
