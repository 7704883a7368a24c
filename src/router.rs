//! Radix-tree request router.
//!
//! One tree per HTTP method. Static segments win over `{param}` segments and
//! conflicting registrations abort at startup, so any (method, path) pair
//! resolves to at most one route. A `{param}` matches exactly one non-empty
//! segment: `/users/{id}` never matches `/users/` or `/users/1/2`.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// A registered route: the pattern it was registered under and its handler.
pub(crate) struct Route<S> {
    pub(crate) pattern: Arc<str>,
    pub(crate) handler: BoxedHandler<S>,
}

impl<S> Clone for Route<S> {
    fn clone(&self) -> Self {
        Self { pattern: Arc::clone(&self.pattern), handler: Arc::clone(&self.handler) }
    }
}

/// The application router.
///
/// Holds the routing table and the state every handler receives (for this
/// service, the repository handle). Build it once at startup; pass it to
/// [`Server::serve`](crate::Server::serve).
pub struct Router<S> {
    routes: HashMap<Method, MatchitRouter<Route<S>>>,
    state: S,
}

impl<S> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn with_state(state: S) -> Self {
        Self { routes: HashMap::new(), state }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or conflicts with an earlier route.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        let route = Route { pattern: Arc::from(path), handler: handler.into_boxed_handler() };
        self.routes
            .entry(method)
            .or_insert_with(MatchitRouter::new)
            .insert(path, route)
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(Route<S>, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((matched.value.clone(), params))
    }
}
