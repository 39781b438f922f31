use chainrouter::{
    del, get, handler_sync, patch, post, put, router, routes, App, Dispatcher, Request, Resolver,
    SharedHandler, TaskQueue,
};
use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use std::hint::black_box;

fn ok() -> SharedHandler {
    handler_sync(|_, _| "ok")
}

fn zoo() -> Resolver {
    router(Some("/zoo"))
        .route(get("/", vec![ok()]))
        .routes(routes(
            Some("/animals"),
            [
                get("/", vec![ok()]),
                post("/", vec![ok()]),
                get("/:id", vec![ok()]),
                put("/:id", vec![ok()]),
                patch("/:id", vec![ok()]),
                del("/:id", vec![ok()]),
                get("/:id/toys/:toy_id", vec![ok()]),
            ],
        ))
        .route(get(
            "/:category/animals/:id/habitats/:habitat_id/sections/:section_id",
            vec![ok()],
        ))
        .route(post(
            "/inventory/:warehouse_id/feeds/:feed_id/items/:item_id/batches/:batch_id",
            vec![ok()],
        ))
        .route(get("/complex/:a/:b/:c/:d/:e/:f/:g/:h/:i", vec![ok()]))
        .route(get("/files/*", vec![ok()]))
        .mount(None)
        .unwrap()
}

fn bench_route_throughput(c: &mut Criterion) {
    let resolver = zoo();
    c.bench_function("route_match", |b| {
        let test_paths = [
            (Method::GET, "/zoo/animals/123"),
            (Method::GET, "/zoo/animals/123/toys/456"),
            (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
            (Method::POST, "/zoo/inventory/1/feeds/2/items/3/batches/4"),
            (Method::GET, "/zoo/complex/1/2/3/4/5/6/7/8/9"),
            (Method::GET, "/zoo/files/a/b/c.txt"),
            (Method::GET, "/nowhere"),
        ];
        b.iter(|| {
            for (method, path) in test_paths.iter() {
                let res = resolver.route(method, path);
                black_box(&res);
            }
        })
    });
}

fn bench_dispatch_throughput(c: &mut Criterion) {
    let queue = TaskQueue::new();
    let app = App::new(
        Dispatcher::new(queue.clone()),
        vec![zoo().into_handler()],
    );
    c.bench_function("dispatch_request", |b| {
        b.iter(|| {
            let request = Request::new(Method::GET, "/zoo/animals/123/toys/456").unwrap();
            let response = app.handle(request);
            queue.run_until_idle();
            black_box(response.status());
        })
    });
}

criterion_group!(benches, bench_route_throughput, bench_dispatch_throughput);
criterion_main!(benches);
