//! # oxide-dispatch
//!
//! URL-to-handler dispatch for HTTP requests.
//!
//! This crate provides:
//! - Route templates with `{name}` path variables, compiled once
//! - A route table keyed by pattern and HTTP method
//! - A dispatcher that strips the deployment prefix, resolves the route and
//!   runs its handler, answering 404/405/500 itself when that fails
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_dispatch::{Dispatcher, Request, Response, RouteContext, RouteTable};
//!
//! async fn hello_handler(_ctx: RouteContext) -> Response {
//!     Response::text("Hello, World!")
//! }
//!
//! async fn user_handler(ctx: RouteContext) -> Response {
//!     Response::json(&serde_json::json!({"id": ctx.var("id")}))
//! }
//!
//! let mut routes = RouteTable::new();
//! routes
//!     .get("/", hello_handler)?
//!     .get("/users/{id}", user_handler)?;
//!
//! let dispatcher = Dispatcher::new(routes);
//! let response = dispatcher.dispatch(Request::get("/users/123")).await;
//! ```
//!
//! ## Matching rules
//!
//! Patterns are tried in registration order and the first one whose shape
//! matches the path wins. If that route has no binding for the request
//! method the answer is 405, even when a later route would accept it.
//!
//! A placeholder matches any non-empty run of characters, `/` included.
//!
//! ## Deployment prefix
//!
//! ```ignore
//! let config = DispatcherConfig::new().base_url("https://example.com/api");
//! let dispatcher = Dispatcher::with_config(routes, &config)?;
//! // "/api/users/7" is matched as "/users/7"
//! ```

mod config;
mod context;
mod dispatcher;
mod error;
pub mod manifest;
mod pattern;
mod request;
mod response;
mod table;

pub use config::{DEFAULT_NOT_FOUND_STATUS, DispatcherConfig, prefix_from_base_url};
pub use context::{Params, REQUEST_KEY, RESERVED_PARAM_KEYS, RouteContext, Variables};
pub use dispatcher::{Dispatcher, RouteMatch};
pub use error::{Result, RouterError};
pub use pattern::RoutePattern;
pub use request::{Method, Request};
pub use response::Response;
pub use table::{Handler, HandlerBinding, RouteEntry, RouteTable, handler};
