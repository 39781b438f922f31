use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::context::{Params, Payload};
use crate::dispatcher::{handler_sync, Dispatcher, Reply};
use crate::error::{HttpError, RouteError};
use crate::middleware::trace_requests;
use crate::router::{del, get, head, post, router, routes, Router};
use crate::server::App;

/// A user record in the demo store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
}

#[derive(Default)]
struct Store {
    users: BTreeMap<u64, User>,
    next_id: u64,
}

impl Store {
    fn seeded() -> Self {
        let mut store = Self::default();
        store.insert("ada".to_string());
        store.insert("grace".to_string());
        store
    }

    fn insert(&mut self, name: String) -> User {
        self.next_id += 1;
        let user = User {
            id: self.next_id,
            name,
        };
        self.users.insert(user.id, user.clone());
        user
    }
}

fn user_id(params: Option<&Params>) -> Result<u64, HttpError> {
    params
        .and_then(|p| p.get("id"))
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| HttpError::bad_request("id must be a positive integer"))
}

/// Route table of the demo users API
///
/// `/api/v1/users` CRUD plus `/api/v1/files/*`, which echoes the wildcard.
#[must_use]
pub fn demo_router() -> Router {
    let store = Rc::new(RefCell::new(Store::seeded()));

    let list = {
        let store = Rc::clone(&store);
        handler_sync(move |_, _| {
            let users: Vec<User> = store.borrow().users.values().cloned().collect();
            Reply::json(&users)
        })
    };

    let show = {
        let store = Rc::clone(&store);
        handler_sync(move |ctx, _| -> anyhow::Result<Reply> {
            let id = user_id(ctx.params())?;
            match store.borrow().users.get(&id) {
                Some(user) => Reply::json(user),
                None => Err(HttpError::not_found().into()),
            }
        })
    };

    let validate = handler_sync(|ctx, payload: Option<Payload>| -> Result<(), HttpError> {
        let user: NewUser = ctx.request().json()?;
        let name = user.name.trim();
        if name.is_empty() {
            return Err(HttpError::bad_request("name must not be empty"));
        }
        ctx.next_with(payload.unwrap_or_default().with("name", name));
        Ok(())
    });

    let create = {
        let store = Rc::clone(&store);
        handler_sync(move |ctx, payload: Option<Payload>| -> anyhow::Result<Reply> {
            let name = payload
                .as_ref()
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str)
                .ok_or_else(|| HttpError::internal("validated name missing from payload"))?
                .to_string();
            let user = store.borrow_mut().insert(name);
            ctx.response().set_status(StatusCode::CREATED);
            Reply::json(&user)
        })
    };

    let remove = {
        let store = Rc::clone(&store);
        handler_sync(move |ctx, _| -> Result<Value, HttpError> {
            let id = user_id(ctx.params())?;
            match store.borrow_mut().users.remove(&id) {
                Some(_) => Ok(Value::Null),
                None => Err(HttpError::not_found()),
            }
        })
    };

    let files = handler_sync(|ctx, _| {
        let wild = ctx.params().and_then(|p| p.wild()).unwrap_or_default();
        format!("file: {wild}")
    });

    router(Some("/api")).routes(routes(
        Some("/v1"),
        [
            get("/users", vec![list]),
            head("/users/:id", vec![Rc::clone(&show)]),
            get("/users/:id", vec![show]),
            post("/users", vec![validate, create]),
            del("/users/:id", vec![remove]),
            get("/files/*", vec![files]),
        ],
    ))
}

/// The demo application: request tracing in front of the users API
///
/// # Errors
///
/// Fails when a demo route template does not compile.
pub fn demo_app(dispatcher: Dispatcher) -> Result<App, RouteError> {
    let resolver = demo_router().mount(None)?;
    Ok(App::new(
        dispatcher,
        vec![trace_requests(), resolver.into_handler()],
    ))
}

/// Requests the `run` command sends through the demo application
#[must_use]
pub fn sample_requests() -> Vec<(Method, &'static str, Option<&'static str>)> {
    vec![
        (Method::GET, "/api/v1/users", None),
        (Method::GET, "/API/V1/users/1/", None),
        (Method::HEAD, "/api/v1/users/1", None),
        (Method::POST, "/api/v1/users", Some(r#"{"name":"linus"}"#)),
        (Method::POST, "/api/v1/users", Some(r#"{"name":""}"#)),
        (Method::POST, "/api/v1/users", Some("not json")),
        (Method::GET, "/api/v1/users/3?verbose=true", None),
        (Method::DELETE, "/api/v1/users/2", None),
        (Method::GET, "/api/v1/users/2", None),
        (Method::GET, "/api/v1/users/abc", None),
        (Method::GET, "/api/v1/files/docs/readme.md", None),
        (Method::GET, "/does/not/exist", None),
    ]
}
