use clap::Parser;
use http::{Method, StatusCode};
use serde_json::{json, Value};

use super::{demo_app, demo_router, send, Cli, Commands};
use crate::dispatcher::Dispatcher;
use crate::scheduler::TaskQueue;
use crate::server::{App, ErrorResponder};

fn demo() -> (App, TaskQueue) {
    let queue = TaskQueue::new();
    let app = demo_app(Dispatcher::new(queue.clone())).unwrap();
    (app, queue)
}

fn json_body(exchanged: &super::Exchanged) -> Value {
    serde_json::from_slice(&exchanged.response.body()).unwrap()
}

#[test]
fn test_parse_defaults() {
    let cli = Cli::try_parse_from(["chainrouter-demo"]).unwrap();
    assert!(cli.command.is_none());
    assert!(cli.log_level.is_none());
    assert!(cli.config.is_none());
}

#[test]
fn test_parse_request_command() {
    let cli = Cli::try_parse_from([
        "chainrouter-demo",
        "request",
        "-m",
        "POST",
        "/api/v1/users",
        "--body",
        "{}",
        "--log-level",
        "warn",
    ])
    .unwrap();
    assert_eq!(cli.log_level.as_deref(), Some("warn"));
    assert_eq!(
        cli.command,
        Some(Commands::Request {
            method: "POST".to_string(),
            target: "/api/v1/users".to_string(),
            body: Some("{}".to_string()),
        })
    );
}

#[test]
fn test_runtime_config_overrides() {
    let cli = Cli::try_parse_from(["chainrouter-demo", "--production", "--log-level", "trace"])
        .unwrap();
    let config = cli.runtime_config().unwrap();
    assert!(config.production);
    assert_eq!(config.logging.log_level, "trace");
}

#[test]
fn test_demo_routes_mount() {
    let resolver = demo_router().mount(None).unwrap();
    assert_eq!(
        resolver.path_patterns(),
        vec![
            "/api/v1/users",
            "/api/v1/users/:id",
            "/api/v1/users/:id",
            "/api/v1/users",
            "/api/v1/users/:id",
            "/api/v1/files/*",
        ]
    );
}

#[test]
fn test_demo_list_and_show() {
    let (app, queue) = demo();

    let list = send(&app, &queue, Method::GET, "/api/v1/users", None).unwrap();
    assert_eq!(list.response.status(), StatusCode::OK);
    assert_eq!(
        json_body(&list),
        json!([{"id": 1, "name": "ada"}, {"id": 2, "name": "grace"}])
    );

    let show = send(&app, &queue, Method::GET, "/API/v1/Users/2/", None).unwrap();
    assert_eq!(json_body(&show), json!({"id": 2, "name": "grace"}));
}

#[test]
fn test_demo_create_runs_both_handlers() {
    let (app, queue) = demo();

    let created = send(
        &app,
        &queue,
        Method::POST,
        "/api/v1/users",
        Some(r#"{"name":" linus "}"#),
    )
    .unwrap();
    assert_eq!(created.response.status(), StatusCode::CREATED);
    assert_eq!(json_body(&created), json!({"id": 3, "name": "linus"}));

    let rejected = send(&app, &queue, Method::POST, "/api/v1/users", Some(r#"{"name":""}"#))
        .unwrap();
    assert_eq!(rejected.response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&rejected), json!({"message": "name must not be empty"}));

    let malformed = send(&app, &queue, Method::POST, "/api/v1/users", Some("nope")).unwrap();
    assert_eq!(malformed.response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_demo_delete_then_missing() {
    let (app, queue) = demo();

    let deleted = send(&app, &queue, Method::DELETE, "/api/v1/users/1", None).unwrap();
    assert_eq!(deleted.response.status(), StatusCode::NO_CONTENT);
    assert!(deleted.response.body().is_empty());

    let missing = send(&app, &queue, Method::GET, "/api/v1/users/1", None).unwrap();
    assert_eq!(missing.response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_demo_head_files_and_fallthrough() {
    let (app, queue) = demo();

    let head = send(&app, &queue, Method::HEAD, "/api/v1/users/1", None).unwrap();
    assert_eq!(head.response.status(), StatusCode::OK);
    assert!(head.response.body().is_empty());

    let file = send(&app, &queue, Method::GET, "/api/v1/files/a/b.txt", None).unwrap();
    assert_eq!(file.response.body_text(), "file: a/b.txt");

    let unknown = send(&app, &queue, Method::GET, "/nowhere", None).unwrap();
    assert_eq!(unknown.response.status(), StatusCode::NOT_FOUND);
    assert!(unknown.response.is_ended());
}

#[test]
fn test_demo_production_hides_messages() {
    let queue = TaskQueue::new();
    let dispatcher = Dispatcher::new(queue.clone()).with_failure(ErrorResponder::new(true));
    let app = demo_app(dispatcher).unwrap();

    let bad = send(&app, &queue, Method::GET, "/api/v1/users/abc", None).unwrap();
    assert_eq!(bad.response.status(), StatusCode::BAD_REQUEST);
    assert!(bad.response.body().is_empty());
}

#[test]
fn test_send_rejects_bad_target() {
    let (app, queue) = demo();
    assert!(send(&app, &queue, Method::GET, "not a target", None).is_err());
}
