//! Request resolution and handler invocation.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::config::{DEFAULT_NOT_FOUND_STATUS, DispatcherConfig};
use crate::context::{RouteContext, Variables};
use crate::error::{Result, RouterError};
use crate::pattern::RoutePattern;
use crate::request::Request;
use crate::response::Response;
use crate::table::{HandlerBinding, RouteTable};

/// A request resolved against the route table.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    /// The pattern that matched.
    pub pattern: &'a RoutePattern,
    /// Binding for the request's method.
    pub binding: &'a HandlerBinding,
    /// The request path with the deployment prefix stripped.
    pub path: &'a str,
    /// Captured variables, keyed by the binding's variable names.
    pub variables: Variables,
    /// The request itself, exposed to handlers as `request`.
    pub request: &'a Request,
}

impl RouteMatch<'_> {
    /// The error reported when the matched binding has no handler.
    pub fn unprocessable(&self) -> RouterError {
        RouterError::Unprocessable {
            method: self.request.method().to_string(),
            path: self.path.to_string(),
        }
    }
}

/// Resolves requests against an immutable [`RouteTable`] and runs handlers.
///
/// The dispatcher owns its table, so no route can be added once serving
/// starts; share it between workers behind an `Arc`.
///
/// ```ignore
/// let mut routes = RouteTable::new();
/// routes.get("/users/{id}", show_user)?;
///
/// let dispatcher = Dispatcher::new(routes);
/// let response = dispatcher.dispatch(Request::get("/users/42")).await;
/// ```
#[derive(Debug)]
pub struct Dispatcher {
    table: RouteTable,
    prefix: String,
    not_found_status: u16,
}

impl Dispatcher {
    /// Creates a dispatcher with no prefix and 404 for unmatched paths.
    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            prefix: String::new(),
            not_found_status: DEFAULT_NOT_FOUND_STATUS,
        }
    }

    /// Creates a dispatcher from deployment settings.
    ///
    /// # Errors
    ///
    /// Fails if the configured base URL cannot be parsed.
    pub fn with_config(table: RouteTable, config: &DispatcherConfig) -> Result<Self> {
        Ok(Self {
            table,
            prefix: config.resolve_prefix()?,
            not_found_status: config.not_found_status,
        })
    }

    /// The route table.
    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    /// The prefix stripped from incoming paths.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the part of `uri` after the first occurrence of the prefix.
    ///
    /// The prefix does not have to be at the start. If it is empty or absent,
    /// `uri` is returned unchanged.
    pub fn strip_prefix<'u>(&self, uri: &'u str) -> &'u str {
        if self.prefix.is_empty() {
            return uri;
        }
        uri.split_once(self.prefix.as_str())
            .map_or(uri, |(_, rest)| rest)
    }

    /// Finds the route for `request` and binds its variables.
    ///
    /// The first pattern matching the path decides the outcome, even when it
    /// has no binding for the request method.
    ///
    /// # Errors
    ///
    /// [`RouterError::NotFound`] when no pattern matches the path and
    /// [`RouterError::MethodNotAllowed`] when the first match lacks the method.
    pub fn resolve<'a>(&'a self, request: &'a Request) -> Result<RouteMatch<'a>> {
        let method = request.method();
        let path = self.strip_prefix(request.uri());

        let Some((pattern, entry, captures)) = self.table.find(path) else {
            debug!(%method, path, "no route matched");
            return Err(RouterError::NotFound {
                method: method.to_string(),
                path: path.to_string(),
            });
        };

        let Some(binding) = entry.get(method) else {
            debug!(%method, path, template = pattern.template(), "method not allowed");
            return Err(RouterError::MethodNotAllowed {
                method: method.to_string(),
                path: path.to_string(),
                allowed: entry.methods(),
            });
        };

        debug!(%method, path, template = pattern.template(), "route matched");
        Ok(RouteMatch {
            pattern,
            binding,
            path,
            variables: Variables::zip(binding.variables(), captures),
            request,
        })
    }

    /// Handles one request; every failure comes back as an error response.
    pub fn dispatch(&self, request: Request) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            let (handler, variables, params) = match self.resolve(&request) {
                Ok(found) => {
                    let Some(handler) = found.binding.handler() else {
                        warn!(
                            method = %request.method(),
                            template = found.pattern.template(),
                            "route has no handler"
                        );
                        return self.error_response(&found.unprocessable());
                    };
                    (
                        Arc::clone(handler),
                        found.variables,
                        Arc::clone(found.binding.params()),
                    )
                }
                Err(err) => return self.error_response(&err),
            };

            handler(RouteContext::new(request, variables, params)).await
        })
    }

    /// Status this dispatcher answers `err` with.
    ///
    /// Same as [`RouterError::status`], except that unmatched paths use the
    /// configured not-found status.
    pub const fn status_for(&self, err: &RouterError) -> u16 {
        match err {
            RouterError::NotFound { .. } => self.not_found_status,
            _ => err.status(),
        }
    }

    fn error_response(&self, err: &RouterError) -> Response {
        Response::from_error(err).status(self.status_for(err))
    }
}
