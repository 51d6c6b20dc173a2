//! End-to-end dispatch behaviour.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::*;
use oxide_dispatch::{
    Dispatcher, DispatcherConfig, Method, Params, Request, Response, RouteContext, RouteTable,
};

#[tokio::test]
async fn binds_placeholder_to_segment() {
    let mut table = RouteTable::new();
    table.get("/users/{id}", tagged("show")).unwrap();
    let dispatcher = dispatcher(table);

    assert_eq!(
        body(&dispatcher, Request::get("/users/42")).await,
        (200, "show:id=42".to_string())
    );
}

#[tokio::test]
async fn binds_every_placeholder() {
    let mut table = RouteTable::new();
    table
        .get("/posts/{post}/comments/{comment}", tagged("comment"))
        .unwrap();
    let dispatcher = dispatcher(table);

    assert_eq!(
        body(&dispatcher, Request::get("/posts/hello-world/comments/7")).await,
        (200, "comment:post=hello-world&comment=7".to_string())
    );
}

#[tokio::test]
async fn wrong_method_is_405_not_404() {
    let mut table = RouteTable::new();
    table.get("/users/{id}", tagged("show")).unwrap();
    let dispatcher = dispatcher(table);

    let response = dispatcher.dispatch(Request::post("/users/42")).await;
    assert_eq!(response.status, 405);
    assert_eq!(response.body_string(), Some("Method not allowed".to_string()));
}

#[tokio::test]
async fn unmatched_path_is_404() {
    let mut table = RouteTable::new();
    table.get("/users/{id}", tagged("show")).unwrap();
    let dispatcher = dispatcher(table);

    assert_eq!(
        body(&dispatcher, Request::get("/posts/1")).await,
        (404, "URL not found".to_string())
    );
    assert_eq!(
        body(&dispatcher, Request::get("/users/")).await,
        (404, "URL not found".to_string())
    );
}

#[tokio::test]
async fn empty_table_is_404() {
    let dispatcher = dispatcher(RouteTable::new());
    assert_eq!(body(&dispatcher, Request::get("/")).await.0, 404);
}

#[tokio::test]
async fn legacy_not_found_status() {
    let config = DispatcherConfig::new().not_found_status(405);
    let dispatcher = Dispatcher::with_config(RouteTable::new(), &config).unwrap();
    assert_eq!(
        body(&dispatcher, Request::get("/missing")).await,
        (405, "URL not found".to_string())
    );
}

#[tokio::test]
async fn reregistration_replaces_handler() {
    let old_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&old_calls);

    let mut table = RouteTable::new();
    table
        .get("/users/{id}", move |_ctx: RouteContext| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Response::text("old") }
        })
        .unwrap()
        .get("/users/{id}", tagged("new"))
        .unwrap();
    let dispatcher = dispatcher(table);

    for _ in 0..3 {
        assert_eq!(
            body(&dispatcher, Request::get("/users/1")).await,
            (200, "new:id=1".to_string())
        );
    }
    assert_eq!(old_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn reregistration_keeps_other_methods() {
    let mut table = RouteTable::new();
    table
        .get("/users/{id}", tagged("show"))
        .unwrap()
        .delete("/users/{id}", tagged("destroy"))
        .unwrap()
        .get("/users/{id}", tagged("show2"))
        .unwrap();
    let dispatcher = dispatcher(table);

    assert_eq!(
        body(&dispatcher, Request::delete("/users/5")).await,
        (200, "destroy:id=5".to_string())
    );
    assert_eq!(
        body(&dispatcher, Request::get("/users/5")).await,
        (200, "show2:id=5".to_string())
    );
}

#[tokio::test]
async fn prefix_is_stripped_before_matching() {
    let mut table = RouteTable::new();
    table.get("/users", tagged("list")).unwrap();
    let dispatcher = dispatcher_with_prefix(table, "/api");

    assert_eq!(
        body(&dispatcher, Request::get("/api/users")).await,
        (200, "list:".to_string())
    );
    // Without the prefix the path is used as-is.
    assert_eq!(body(&dispatcher, Request::get("/users")).await.0, 200);
}

#[tokio::test]
async fn prefix_from_base_url() {
    let mut table = RouteTable::new();
    table.get("/users/{id}", tagged("show")).unwrap();
    let config = DispatcherConfig::new().base_url("https://example.com/app/");
    let dispatcher = Dispatcher::with_config(table, &config).unwrap();

    assert_eq!(dispatcher.prefix(), "/app");
    assert_eq!(
        body(&dispatcher, Request::get("/app/users/9")).await,
        (200, "show:id=9".to_string())
    );
}

#[tokio::test]
async fn undeclared_variable_reads_as_empty() {
    let mut table = RouteTable::new();
    table
        .get("/users/{id}", |ctx: RouteContext| async move {
            Response::text(format!("[{}][{}]", ctx.var("id"), ctx.var("slug")))
        })
        .unwrap();
    let dispatcher = dispatcher(table);

    assert_eq!(
        body(&dispatcher, Request::get("/users/3")).await,
        (200, "[3][]".to_string())
    );
}

#[tokio::test]
async fn handler_receives_request_and_params() {
    let mut params = Params::new();
    params.insert("section".into(), serde_json::json!("admin"));

    let mut table = RouteTable::new();
    table
        .register(
            Method::Put,
            "/items/{id}",
            |ctx: RouteContext| async move {
                let section = ctx
                    .param("section")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let token = ctx.request().get_header("x-token").unwrap_or("-").to_string();
                let payload = String::from_utf8_lossy(&ctx.request().body).into_owned();
                Response::text(format!("{section} {token} {} {payload}", ctx.var("id")))
            },
            params,
        )
        .unwrap();
    let dispatcher = dispatcher(table);

    let request = Request::put("/items/8")
        .header("X-Token", "abc")
        .body("data");
    assert_eq!(
        body(&dispatcher, request).await,
        (200, "admin abc 8 data".to_string())
    );
}

#[tokio::test]
async fn first_structural_match_is_terminal() {
    let mut table = RouteTable::new();
    table
        .get("/users/{id}", tagged("show"))
        .unwrap()
        .post("/users/active", tagged("activate"))
        .unwrap();
    let dispatcher = dispatcher(table);

    // "/users/{id}" was registered first and only accepts GET.
    let response = dispatcher.dispatch(Request::post("/users/active")).await;
    assert_eq!(response.status, 405);
    assert_eq!(response.headers.get("Allow"), Some(&"GET".to_string()));

    assert_eq!(
        body(&dispatcher, Request::get("/users/active")).await,
        (200, "show:id=active".to_string())
    );
}

#[tokio::test]
async fn registration_order_decides_overlap() {
    let mut table = RouteTable::new();
    table
        .get("/users/active", tagged("active"))
        .unwrap()
        .get("/users/{id}", tagged("show"))
        .unwrap();
    let dispatcher = dispatcher(table);

    assert_eq!(
        body(&dispatcher, Request::get("/users/active")).await,
        (200, "active:".to_string())
    );
    assert_eq!(
        body(&dispatcher, Request::get("/users/7")).await,
        (200, "show:id=7".to_string())
    );
}

#[tokio::test]
async fn declared_route_without_handler_is_500() {
    let mut table = RouteTable::new();
    table
        .declare(Method::Get, "/reports/{year}", Params::new())
        .unwrap();
    let dispatcher = dispatcher(table);

    assert_eq!(
        body(&dispatcher, Request::get("/reports/2024")).await,
        (500, "route could not be processed".to_string())
    );
    assert_eq!(body(&dispatcher, Request::post("/reports/2024")).await.0, 405);
}

#[tokio::test]
async fn decoded_target_is_matched() {
    let mut table = RouteTable::new();
    table.get("/files/{name}", tagged("file")).unwrap();
    let dispatcher = dispatcher(table);

    let request = Request::from_target(Method::Get, "/files/annual%20report?download=1");
    assert_eq!(request.get_query("download"), Some("1"));
    assert_eq!(
        body(&dispatcher, request).await,
        (200, "file:name=annual report".to_string())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatch_shares_table() {
    let mut table = RouteTable::new();
    table.get("/users/{id}", tagged("show")).unwrap();
    let dispatcher = Arc::new(dispatcher(table));

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                let response = dispatcher.dispatch(Request::get(format!("/users/{i}"))).await;
                (i, response.body_string())
            })
        })
        .collect();

    for task in tasks {
        let (i, body) = task.await.unwrap();
        assert_eq!(body, Some(format!("show:id={i}")));
    }
}
