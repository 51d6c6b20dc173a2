//! Dispatcher configuration.

use serde::Deserialize;
use url::Url;

use crate::error::Result;

/// Status used for unmatched paths unless configured otherwise.
pub const DEFAULT_NOT_FOUND_STATUS: u16 = 404;

/// Deployment settings for a [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Public base URL of the service, e.g. `https://example.com/app`.
    /// Its path becomes the prefix stripped from incoming paths.
    pub base_url: Option<String>,
    /// Explicit prefix; takes precedence over `base_url`.
    pub prefix: Option<String>,
    /// Status returned when no route matches the path.
    pub not_found_status: u16,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            prefix: None,
            not_found_status: DEFAULT_NOT_FOUND_STATUS,
        }
    }
}

impl DispatcherConfig {
    /// Creates the default configuration: no prefix, 404 for unmatched paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets an explicit prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the status returned for unmatched paths.
    #[must_use]
    pub fn not_found_status(mut self, status: u16) -> Self {
        self.not_found_status = status;
        self
    }

    /// Resolves the path prefix to strip from incoming request paths.
    ///
    /// # Errors
    ///
    /// Fails if `base_url` is set but is not an absolute URL.
    pub fn resolve_prefix(&self) -> Result<String> {
        if let Some(prefix) = &self.prefix {
            return Ok(prefix.trim_end_matches('/').to_string());
        }
        match &self.base_url {
            Some(base) => prefix_from_base_url(base),
            None => Ok(String::new()),
        }
    }
}

/// Returns the path of `base` without its trailing slash.
///
/// `https://example.com/` and `https://example.com` both give an empty prefix.
///
/// # Errors
///
/// Fails if `base` does not parse as an absolute URL.
pub fn prefix_from_base_url(base: &str) -> Result<String> {
    let url = Url::parse(base)?;
    Ok(url.path().trim_end_matches('/').to_string())
}
