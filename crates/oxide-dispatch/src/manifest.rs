//! Route tables described in JSON.
//!
//! A manifest is an array of route definitions:
//!
//! ```json
//! [
//!   { "method": "GET", "path": "/users/{id}", "handler": "echo" },
//!   { "method": "GET", "path": "/health", "handler": "text",
//!     "params": { "body": "ok" } },
//!   { "method": "DELETE", "path": "/users/{id}" }
//! ]
//! ```
//!
//! `handler` names are looked up in a [`HandlerRegistry`]. A route without
//! one is declared unbound and answers 500.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::context::{Params, RouteContext};
use crate::error::{Result, RouterError};
use crate::request::Method;
use crate::response::Response;
use crate::table::{Handler, RouteTable, handler};

/// One route in a manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteSpec {
    /// HTTP method, any case.
    pub method: String,
    /// Route template.
    pub path: String,
    /// Registered handler name.
    #[serde(default)]
    pub handler: Option<String>,
    /// Static params forwarded to the handler.
    #[serde(default)]
    pub params: Params,
}

/// An ordered list of route definitions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RouteManifest {
    /// Routes in registration order.
    pub routes: Vec<RouteSpec>,
}

impl RouteManifest {
    /// Parses a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or unknown fields.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a manifest file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading route manifest");
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Registers every route, in order, into a new table.
    ///
    /// # Errors
    ///
    /// Fails on an unknown method or handler name, or an invalid template.
    pub fn build(&self, registry: &HandlerRegistry) -> Result<RouteTable> {
        let mut table = RouteTable::new();

        for spec in &self.routes {
            let method: Method = spec.method.parse()?;
            match &spec.handler {
                Some(name) => {
                    let handler = registry.get(name).ok_or_else(|| {
                        RouterError::Manifest(format!(
                            "unknown handler {name:?} for {method} {}",
                            spec.path
                        ))
                    })?;
                    table.register_boxed(method, &spec.path, handler, spec.params.clone())?;
                }
                None => {
                    table.declare(method, &spec.path, spec.params.clone())?;
                }
            }
        }

        Ok(table)
    }
}

/// Named handlers that manifests can refer to.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `echo` and `text` handlers.
    pub fn builtin() -> Self {
        Self::new().with("echo", echo).with("text", text)
    }

    /// Adds a named handler.
    #[must_use]
    pub fn with<F, Fut>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(RouteContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Response> + Send + 'static,
    {
        self.handlers.insert(name.into(), handler(f));
        self
    }

    /// Looks up a handler by name.
    pub fn get(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).cloned()
    }

    /// Registered handler names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Answers with a JSON description of the matched request.
pub async fn echo(ctx: RouteContext) -> Response {
    Response::json(&serde_json::json!({
        "method": ctx.request().method().as_str(),
        "uri": ctx.request().uri(),
        "variables": ctx.variables(),
        "params": ctx.params(),
    }))
}

/// Answers with the `body` param as plain text, using the `status` param if set.
pub async fn text(ctx: RouteContext) -> Response {
    let body = ctx
        .param("body")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();
    let status = ctx
        .param("status")
        .and_then(serde_json::Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or(200);
    Response::text(body).status(status)
}
