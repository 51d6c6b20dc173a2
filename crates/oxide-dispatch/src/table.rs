//! The route table: compiled patterns, each with per-method handler bindings.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::context::{Params, RESERVED_PARAM_KEYS, RouteContext};
use crate::error::{Result, RouterError};
use crate::pattern::RoutePattern;
use crate::request::Method;
use crate::response::Response;

/// A boxed async handler function.
pub type Handler = Arc<dyn Fn(RouteContext) -> BoxFuture<'static, Response> + Send + Sync>;

/// Boxes an async function into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(RouteContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// What one (pattern, method) pair is bound to.
#[derive(Clone)]
pub struct HandlerBinding {
    handler: Option<Handler>,
    variables: Vec<String>,
    params: Arc<Params>,
}

impl HandlerBinding {
    /// The bound handler, if any.
    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Variable names of the template this binding was registered with.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Static metadata supplied at registration.
    pub fn params(&self) -> &Arc<Params> {
        &self.params
    }
}

impl fmt::Debug for HandlerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("handler", &self.handler.as_ref().map(|_| "<fn>"))
            .field("variables", &self.variables)
            .field("params", &self.params)
            .finish()
    }
}

/// Method bindings for a single pattern.
#[derive(Debug, Clone, Default)]
pub struct RouteEntry {
    bindings: BTreeMap<Method, HandlerBinding>,
}

impl RouteEntry {
    /// Gets the binding for `method`.
    pub fn get(&self, method: Method) -> Option<&HandlerBinding> {
        self.bindings.get(&method)
    }

    /// Methods bound on this pattern.
    pub fn methods(&self) -> Vec<Method> {
        self.bindings.keys().copied().collect()
    }
}

/// Registered routes, in registration order.
///
/// The table is filled during setup and then handed to a
/// [`Dispatcher`](crate::Dispatcher), which only reads it.
///
/// ```ignore
/// let mut routes = RouteTable::new();
/// routes
///     .get("/users", list_users)?
///     .get("/users/{id}", show_user)?
///     .post("/users", create_user)?;
/// ```
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<(RoutePattern, RouteEntry)>,
    /// Compiled expression -> position in `routes`.
    index: HashMap<String, usize>,
}

impl RouteTable {
    /// Creates an empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to `method` on `template`, with static `params`.
    ///
    /// Registering the same method and template again replaces the earlier
    /// handler; other methods on the template keep theirs.
    ///
    /// # Errors
    ///
    /// Fails if the template does not compile or `params` uses a reserved key.
    pub fn register<F, Fut>(
        &mut self,
        method: Method,
        template: &str,
        f: F,
        params: Params,
    ) -> Result<&mut Self>
    where
        F: Fn(RouteContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.insert(method, template, Some(handler(f)), params)
    }

    /// Like [`RouteTable::register`], for an already boxed handler.
    ///
    /// # Errors
    ///
    /// Same as [`RouteTable::register`].
    pub fn register_boxed(
        &mut self,
        method: Method,
        template: &str,
        handler: Handler,
        params: Params,
    ) -> Result<&mut Self> {
        self.insert(method, template, Some(handler), params)
    }

    /// Declares a route without a handler.
    ///
    /// Requests reaching it are answered with a 500 response.
    ///
    /// # Errors
    ///
    /// Same as [`RouteTable::register`].
    pub fn declare(&mut self, method: Method, template: &str, params: Params) -> Result<&mut Self> {
        self.insert(method, template, None, params)
    }

    /// Adds a GET route.
    ///
    /// # Errors
    ///
    /// Fails if the template does not compile.
    pub fn get<F, Fut>(&mut self, template: &str, handler: F) -> Result<&mut Self>
    where
        F: Fn(RouteContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.register(Method::Get, template, handler, Params::new())
    }

    /// Adds a POST route.
    ///
    /// # Errors
    ///
    /// Fails if the template does not compile.
    pub fn post<F, Fut>(&mut self, template: &str, handler: F) -> Result<&mut Self>
    where
        F: Fn(RouteContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.register(Method::Post, template, handler, Params::new())
    }

    /// Adds a PUT route.
    ///
    /// # Errors
    ///
    /// Fails if the template does not compile.
    pub fn put<F, Fut>(&mut self, template: &str, handler: F) -> Result<&mut Self>
    where
        F: Fn(RouteContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.register(Method::Put, template, handler, Params::new())
    }

    /// Adds a PATCH route.
    ///
    /// # Errors
    ///
    /// Fails if the template does not compile.
    pub fn patch<F, Fut>(&mut self, template: &str, handler: F) -> Result<&mut Self>
    where
        F: Fn(RouteContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.register(Method::Patch, template, handler, Params::new())
    }

    /// Adds a DELETE route.
    ///
    /// # Errors
    ///
    /// Fails if the template does not compile.
    pub fn delete<F, Fut>(&mut self, template: &str, handler: F) -> Result<&mut Self>
    where
        F: Fn(RouteContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.register(Method::Delete, template, handler, Params::new())
    }

    fn insert(
        &mut self,
        method: Method,
        template: &str,
        handler: Option<Handler>,
        params: Params,
    ) -> Result<&mut Self> {
        if let Some(key) = RESERVED_PARAM_KEYS
            .iter()
            .find(|key| params.contains_key(**key))
        {
            return Err(RouterError::ReservedName((*key).to_string()));
        }

        let pattern = RoutePattern::compile(template)?;
        let binding = HandlerBinding {
            handler,
            variables: pattern.variables().to_vec(),
            params: Arc::new(params),
        };

        let existing = self.index.get(pattern.as_str()).copied();
        let position = match existing {
            Some(position) => position,
            None => {
                let position = self.routes.len();
                self.index.insert(pattern.as_str().to_string(), position);
                self.routes.push((pattern, RouteEntry::default()));
                position
            }
        };

        let entry = &mut self.routes[position].1;
        if entry.bindings.insert(method, binding).is_some() {
            warn!(%method, template, "route re-registered, replacing previous binding");
        } else {
            debug!(%method, template, "route registered");
        }

        Ok(self)
    }

    /// Number of distinct patterns.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates patterns in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&RoutePattern, &RouteEntry)> {
        self.routes.iter().map(|(pattern, entry)| (pattern, entry))
    }

    /// Finds the first pattern matching `path`, with its captures.
    pub fn find<'p>(&self, path: &'p str) -> Option<(&RoutePattern, &RouteEntry, Vec<&'p str>)> {
        self.routes.iter().find_map(|(pattern, entry)| {
            pattern
                .captures(path)
                .map(|captures| (pattern, entry, captures))
        })
    }

    /// Methods accepted on the first pattern matching `path`.
    pub fn allowed_methods(&self, path: &str) -> Option<Vec<Method>> {
        self.find(path).map(|(_, entry, _)| entry.methods())
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.routes
                    .iter()
                    .map(|(pattern, entry)| (pattern.template(), entry.methods())),
            )
            .finish()
    }
}
