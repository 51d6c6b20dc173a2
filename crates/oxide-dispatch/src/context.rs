//! Values handed to handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::ser::{Serialize, Serializer};

use crate::request::Request;

/// Name under which the current request is exposed to a handler.
pub const REQUEST_KEY: &str = "request";

/// Param keys that may not appear in a route's static metadata.
pub const RESERVED_PARAM_KEYS: [&str; 2] = ["controller", "variables"];

/// Static metadata attached to a route at registration time.
pub type Params = BTreeMap<String, serde_json::Value>;

/// Path variables captured from a request, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    pairs: Vec<(String, String)>,
}

impl Variables {
    /// Creates an empty variable set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `names` to `values` positionally.
    pub(crate) fn zip(names: &[String], values: Vec<&str>) -> Self {
        Self {
            pairs: names
                .iter()
                .cloned()
                .zip(values.into_iter().map(str::to_string))
                .collect(),
        }
    }

    /// Gets a variable value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parses a variable as a specific type.
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    /// Returns an iterator over `(name, value)` pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true when the route declared no variables.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Serialize for Variables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Everything a handler gets to see about the request it serves.
///
/// Handlers pull the values they need out by name:
///
/// ```ignore
/// async fn show_user(ctx: RouteContext) -> Response {
///     Response::text(format!("user {}", ctx.var("id")))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RouteContext {
    request: Request,
    variables: Variables,
    params: Arc<Params>,
}

impl RouteContext {
    pub(crate) const fn new(request: Request, variables: Variables, params: Arc<Params>) -> Self {
        Self {
            request,
            variables,
            params,
        }
    }

    /// The request being served.
    pub const fn request(&self) -> &Request {
        &self.request
    }

    /// Takes the request out of the context.
    pub fn into_request(self) -> Request {
        self.request
    }

    /// All captured variables.
    pub const fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Gets a captured variable, if the route declares it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name)
    }

    /// Gets a captured variable, or `""` when the route has no such variable.
    pub fn var(&self, name: &str) -> &str {
        self.variables.get(name).unwrap_or("")
    }

    /// Static metadata supplied when the route was registered.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Gets one static param.
    pub fn param(&self, key: &str) -> Option<&serde_json::Value> {
        self.params.get(key)
    }
}
