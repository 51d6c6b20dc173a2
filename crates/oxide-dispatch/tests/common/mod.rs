#![allow(dead_code)]

use oxide_dispatch::{Dispatcher, DispatcherConfig, Request, Response, RouteContext, RouteTable};

/// Handler that reports which handler ran and with which variables.
pub fn tagged(
    tag: &'static str,
) -> impl Fn(RouteContext) -> std::future::Ready<Response> + Send + Sync + 'static {
    move |ctx: RouteContext| {
        let vars = ctx
            .variables()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        std::future::ready(Response::text(format!("{tag}:{vars}")))
    }
}

pub fn dispatcher(table: RouteTable) -> Dispatcher {
    Dispatcher::new(table)
}

pub fn dispatcher_with_prefix(table: RouteTable, prefix: &str) -> Dispatcher {
    Dispatcher::with_config(table, &DispatcherConfig::new().prefix(prefix))
        .unwrap_or_else(|e| panic!("Failed to build dispatcher: {e}"))
}

pub async fn body(dispatcher: &Dispatcher, request: Request) -> (u16, String) {
    let response = dispatcher.dispatch(request).await;
    let body = response
        .body_string()
        .unwrap_or_else(|| panic!("Response body is not UTF-8"));
    (response.status, body)
}
