use http::Method;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

use super::compile::compile;
use super::core::Resolver;
use crate::dispatcher::HandlerList;
use crate::error::RouteError;

/// One declared route: method, path template and handler chain.
///
/// Built with [`get`], [`post`], [`put`], [`del`], [`head`], [`patch`] or
/// [`options`]. Templates are concatenated as plain strings when mounted, so
/// namespaces and paths should each start with `/`.
#[derive(Clone)]
pub struct RouteEntity {
    pub method: Method,
    pub path: String,
    pub handlers: HandlerList,
    /// Set by [`routes`]; empty when the entity was declared on its own
    pub namespace: String,
}

impl RouteEntity {
    pub fn new(method: Method, path: &str, handlers: impl Into<HandlerList>) -> Self {
        Self {
            method,
            path: path.to_string(),
            handlers: handlers.into(),
            namespace: String::new(),
        }
    }

    #[must_use]
    pub fn single(&self) -> bool {
        self.handlers.len() == 1
    }
}

impl fmt::Debug for RouteEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntity")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("handlers", &self.handlers.len())
            .field("namespace", &self.namespace)
            .finish()
    }
}

pub fn get(path: &str, handlers: impl Into<HandlerList>) -> RouteEntity {
    RouteEntity::new(Method::GET, path, handlers)
}

pub fn post(path: &str, handlers: impl Into<HandlerList>) -> RouteEntity {
    RouteEntity::new(Method::POST, path, handlers)
}

pub fn put(path: &str, handlers: impl Into<HandlerList>) -> RouteEntity {
    RouteEntity::new(Method::PUT, path, handlers)
}

/// `DELETE` route (`delete` reads poorly next to the other verbs in user code)
pub fn del(path: &str, handlers: impl Into<HandlerList>) -> RouteEntity {
    RouteEntity::new(Method::DELETE, path, handlers)
}

/// `HEAD` route
///
/// A matched HEAD route is answered with an empty 200 by the resolver; its
/// handlers never run.
pub fn head(path: &str, handlers: impl Into<HandlerList>) -> RouteEntity {
    RouteEntity::new(Method::HEAD, path, handlers)
}

pub fn patch(path: &str, handlers: impl Into<HandlerList>) -> RouteEntity {
    RouteEntity::new(Method::PATCH, path, handlers)
}

pub fn options(path: &str, handlers: impl Into<HandlerList>) -> RouteEntity {
    RouteEntity::new(Method::OPTIONS, path, handlers)
}

/// Group `entities` under a shared namespace
///
/// The namespace is placed between the router's namespace and each entity's
/// path. `None` clears any namespace the entities carried.
pub fn routes(
    namespace: Option<&str>,
    entities: impl IntoIterator<Item = RouteEntity>,
) -> Vec<RouteEntity> {
    let namespace = namespace.unwrap_or_default();
    entities
        .into_iter()
        .map(|mut entity| {
            entity.namespace = namespace.to_string();
            entity
        })
        .collect()
}

/// Builder for a route table
///
/// Collects entities in registration order, which is also match order. A
/// `Router` is a declaration only: [`Router::mount`] compiles it into a
/// [`Resolver`], and the same `Router` can be mounted any number of times.
///
/// ```rust,ignore
/// let api = router(Some("/api"))
///     .routes(routes(Some("/v1"), [get("/users/:id", vec![show_user])]))
///     .route(get("/health", vec![health]))
///     .mount(None)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Router {
    namespace: String,
    entities: Vec<RouteEntity>,
}

/// Start a route table under an optional namespace
#[must_use]
pub fn router(namespace: Option<&str>) -> Router {
    Router {
        namespace: namespace.unwrap_or_default().to_string(),
        entities: Vec::new(),
    }
}

impl Router {
    #[must_use]
    pub fn route(mut self, entity: RouteEntity) -> Self {
        self.entities.push(entity);
        self
    }

    /// Append a group built with [`routes`]
    #[must_use]
    pub fn routes(mut self, group: impl IntoIterator<Item = RouteEntity>) -> Self {
        self.entities.extend(group);
        self
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn entities(&self) -> &[RouteEntity] {
        &self.entities
    }

    /// Compile every entity under `prefix + namespace`
    ///
    /// # Errors
    ///
    /// Returns the first [`RouteError`] in registration order.
    pub fn mount(&self, prefix: Option<&str>) -> Result<Resolver, RouteError> {
        let mut base = prefix.unwrap_or_default().to_string();
        base.push_str(&self.namespace);

        debug!(
            base = %base,
            entities = self.entities.len(),
            "Mounting router"
        );

        let compiled = self
            .entities
            .iter()
            .map(|entity| compile(entity, &base))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Resolver::new(Rc::from(compiled)))
    }
}
