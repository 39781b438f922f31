use super::{compile, get, head, post, router, routes, CompiledPattern};
use crate::dispatcher::{handler_sync, SharedHandler};
use crate::error::RouteError;
use http::Method;

fn ok() -> SharedHandler {
    handler_sync(|_, _| "ok")
}

#[test]
fn test_root_path() {
    for template in ["", "/", "//"] {
        let p = CompiledPattern::parse(template).unwrap();
        assert!(p.is_match("/"), "{template:?} should match /");
        assert!(!p.is_match("/x"));
        assert!(!p.has_params());
    }
}

#[test]
fn test_parameterized_path() {
    let p = CompiledPattern::parse("/items/:id").unwrap();
    assert!(p.is_match("/items/123"));
    assert!(p.is_match("/items/123/"));
    assert!(!p.is_match("/items"));
    assert!(!p.is_match("/items/123/extra"));
    let keys: Vec<&str> = p.keys().iter().map(AsRef::as_ref).collect();
    assert_eq!(keys, vec!["id"]);
    assert_eq!(p.captures("/items/123").unwrap().get("id"), Some("123"));
}

#[test]
fn test_nested_path() {
    let p = CompiledPattern::parse("/a/:b/c").unwrap();
    assert!(p.is_match("/a/1/c"));
    assert!(!p.is_match("/a/1/d"));
}

#[test]
fn test_case_insensitive() {
    let p = CompiledPattern::parse("/Users/:id").unwrap();
    assert!(p.is_match("/users/Bob"));
    assert_eq!(p.captures("/USERS/Bob").unwrap().get("id"), Some("Bob"));
}

#[test]
fn test_literal_is_escaped() {
    let p = CompiledPattern::parse("/file.json").unwrap();
    assert!(p.is_match("/file.json"));
    assert!(!p.is_match("/fileXjson"));
}

#[test]
fn test_optional_params() {
    let p = CompiledPattern::parse("/posts/:year?/:month?").unwrap();

    let none = p.captures("/posts").unwrap();
    assert_eq!(none.len(), 2);
    assert!(none.contains_key("year"));
    assert_eq!(none.get("year"), None);
    assert_eq!(none.get("month"), None);

    let one = p.captures("/posts/2024").unwrap();
    assert_eq!(one.get("year"), Some("2024"));
    assert_eq!(one.get("month"), None);

    let two = p.captures("/posts/2024/05").unwrap();
    assert_eq!(two.get("year"), Some("2024"));
    assert_eq!(two.get("month"), Some("05"));
}

#[test]
fn test_wildcard() {
    let p = CompiledPattern::parse("/static/*").unwrap();
    let params = p.captures("/static/css/site.css").unwrap();
    assert_eq!(params.wild(), Some("css/site.css"));
    assert!(!p.is_match("/other/a"));
}

#[test]
fn test_optional_before_required() {
    let p = CompiledPattern::parse("/path/:foo?/:bar").unwrap();

    let one = p.captures("/path/connor").unwrap();
    assert_eq!(one.get("foo"), None);
    assert_eq!(one.get("bar"), Some("connor"));

    let two = p.captures("/path/john/connor").unwrap();
    assert_eq!(two.get("foo"), Some("john"));
    assert_eq!(two.get("bar"), Some("connor"));

    assert!(!p.is_match("/path"));
}

#[test]
fn test_rejects_misplaced_wildcard() {
    let err = CompiledPattern::parse("/a/*/b").unwrap_err();
    assert!(matches!(err, RouteError::MisplacedWildcard { .. }));
}

#[test]
fn test_rejects_invalid_param_names() {
    for template in ["/a/:", "/a/:?", "/a/:na-me", "/a/:x.y"] {
        let err = CompiledPattern::parse(template).unwrap_err();
        assert!(
            matches!(err, RouteError::InvalidParamName { .. }),
            "{template} gave {err:?}"
        );
    }
}

#[test]
fn test_compile_full_template() {
    let group = routes(Some("/v1"), [get("/users/:id", vec![ok()])]);
    let route = compile(&group[0], "/api").unwrap();
    assert_eq!(route.template, "/api/v1/users/:id");
    assert_eq!(route.method, Method::GET);
    assert!(route.single());
    assert!(route.pattern.is_match("/api/v1/users/7"));
}

#[test]
fn test_compile_rejects_empty_handlers() {
    let entity = get("/nothing", Vec::<SharedHandler>::new());
    let err = compile(&entity, "").unwrap_err();
    assert_eq!(
        err,
        RouteError::NoHandlers {
            method: Method::GET,
            template: "/nothing".to_string()
        }
    );
}

#[test]
fn test_route_first_match_wins() {
    let resolver = router(None)
        .route(get("/users/:id", vec![ok()]))
        .route(get("/users/me", vec![ok()]))
        .mount(None)
        .unwrap();

    let m = resolver.route(&Method::GET, "/users/me").unwrap();
    assert_eq!(m.route.template, "/users/:id");
    assert_eq!(m.get("id"), Some("me"));
}

#[test]
fn test_route_method_must_match() {
    let resolver = router(None)
        .route(post("/users", vec![ok()]))
        .mount(None)
        .unwrap();
    assert!(resolver.route(&Method::GET, "/users").is_none());
    assert!(resolver.route(&Method::POST, "/users").is_some());
}

#[test]
fn test_mount_under_prefixes() {
    let users = router(Some("/users")).route(get("/:id", vec![ok()]));
    let v1 = users.mount(Some("/v1")).unwrap();
    let v2 = users.mount(Some("/v2")).unwrap();

    assert_eq!(v1.path_patterns(), vec!["/v1/users/:id".to_string()]);
    assert_eq!(v2.path_patterns(), vec!["/v2/users/:id".to_string()]);
    assert!(v1.route(&Method::GET, "/v2/users/1").is_none());
    assert!(v2.route(&Method::GET, "/v2/users/1").is_some());
}

#[test]
fn test_mount_reports_first_error() {
    let result = router(None)
        .route(get("/fine", vec![ok()]))
        .route(head("/a/*/b", vec![ok()]))
        .mount(None);
    assert!(matches!(result, Err(RouteError::MisplacedWildcard { .. })));
}

#[test]
fn test_route_skips_other_methods_and_keeps_captures() {
    let resolver = router(Some("/posts"))
        .route(post("/:year?/:month?", vec![ok()]))
        .route(get("/:year?/:month?", vec![ok()]))
        .mount(None)
        .unwrap();

    let m = resolver.route(&Method::GET, "/posts/2024").unwrap();
    assert_eq!(m.route.method, Method::GET);
    assert_eq!(m.get("year"), Some("2024"));
    assert!(m.params.contains_key("month"));
    assert_eq!(m.get("month"), None);
}
