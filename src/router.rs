//! Radix-tree request router.
//!
//! One tree per HTTP method, plus an optional per-method fallback that
//! catches every path the tree does not. formcast uses the fallbacks for
//! static files (`GET`) and form intake (`POST` to any path).

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every registration returns `self` so calls chain.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    fallbacks: HashMap<Method, BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), fallbacks: HashMap::new() }
    }

    /// Register a handler for an exact method + path pair.
    ///
    /// # Panics
    ///
    /// Panics on an invalid or conflicting route; routes are fixed at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    /// Handler for any `method` request whose path matched no route.
    pub fn fallback(mut self, method: Method, handler: impl Handler) -> Self {
        self.fallbacks.insert(method, handler.into_boxed_handler());
        self
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Option<BoxedHandler> {
        self.routes
            .get(&method)
            .and_then(|tree| tree.at(path).ok())
            .map(|matched| matched.value)
            .or_else(|| self.fallbacks.get(&method))
            .map(Arc::clone)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
