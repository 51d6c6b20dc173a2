//! Error types for routing and dispatch.

use thiserror::Error;

use crate::request::Method;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No route matched the request path.
    #[error("no route matched: {method} {path}")]
    NotFound { method: String, path: String },

    /// A route matched the path but has no binding for the method.
    #[error("method not allowed: {method} for {path}")]
    MethodNotAllowed {
        method: String,
        path: String,
        /// Methods the matched route does accept.
        allowed: Vec<Method>,
    },

    /// A route and method matched, but no handler is bound to them.
    #[error("route could not be processed: {method} {path}")]
    Unprocessable { method: String, path: String },

    /// Invalid route template.
    #[error("invalid route template {template:?}: {reason}")]
    InvalidPattern { template: String, reason: String },

    /// A reserved name was used as a route variable or static param.
    #[error("reserved name used in route definition: {0}")]
    ReservedName(String),

    /// Unknown HTTP method.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The deployment base URL could not be parsed.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// Route manifest is inconsistent.
    #[error("route manifest error: {0}")]
    Manifest(String),

    /// IO error while reading a manifest.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed manifest JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RouterError {
    /// HTTP status code for this error when surfaced as a response.
    pub const fn status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::MethodNotAllowed { .. } | Self::InvalidMethod(_) => 405,
            _ => 500,
        }
    }

    /// Response body text for this error.
    pub const fn message(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "URL not found",
            Self::MethodNotAllowed { .. } | Self::InvalidMethod(_) => "Method not allowed",
            _ => "route could not be processed",
        }
    }
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
