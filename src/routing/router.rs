//! Route registration module
//!
//! [`Router`] is the setup-time surface used both for the application root and
//! for sub-routers that get mounted elsewhere.

use super::chain::Handler;
use super::compose;
use super::node::RouteNode;
use crate::http::Method;

/// Options accepted by every registration call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOptions {
    /// Dispatch unmatched path suffixes to this route instead of failing
    pub catch_all: bool,
}

/// What gets registered at a path
///
/// Covers the three registration forms: a chain of middlewares ending in a
/// handler, a sub-router, and a combination of handler and sub-router.
#[derive(Clone, Default)]
pub struct Route {
    pub(crate) middlewares: Vec<Handler>,
    pub(crate) handler: Option<Handler>,
    pub(crate) router: Option<Router>,
    pub(crate) options: RouteOptions,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single handler
    pub fn to(handler: Handler) -> Self {
        Self::new().handler(handler)
    }

    /// Middlewares followed by a handler: the last entry is the handler
    pub fn chain(handlers: impl IntoIterator<Item = Handler>) -> Self {
        let mut middlewares: Vec<Handler> = handlers.into_iter().collect();
        let handler = middlewares.pop();
        Self {
            middlewares,
            handler,
            ..Self::default()
        }
    }

    /// A sub-router
    pub fn mount(router: Router) -> Self {
        Self::new().router(router)
    }

    /// Append a middleware that runs before the route's own
    #[must_use]
    pub fn middleware(mut self, middleware: Handler) -> Self {
        self.middlewares.push(middleware);
        self
    }

    #[must_use]
    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    #[must_use]
    pub const fn catch_all(mut self, catch_all: bool) -> Self {
        self.options.catch_all = catch_all;
        self
    }

    #[must_use]
    pub const fn options(mut self, options: RouteOptions) -> Self {
        self.options = options;
        self
    }
}

impl From<Handler> for Route {
    fn from(handler: Handler) -> Self {
        Self::to(handler)
    }
}

impl From<Vec<Handler>> for Route {
    fn from(handlers: Vec<Handler>) -> Self {
        Self::chain(handlers)
    }
}

impl From<Router> for Route {
    fn from(router: Router) -> Self {
        Self::mount(router)
    }
}

/// A tree of routes under construction
#[derive(Debug, Clone, Default)]
pub struct Router {
    root: RouteNode,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `route` at `path`, for `method` or for any method when `None`
    pub fn register(
        &mut self,
        method: Option<Method>,
        path: &str,
        route: impl Into<Route>,
    ) -> &mut Self {
        compose::attach(&mut self.root, method, path, route.into());
        self
    }

    /// Method-agnostic route
    pub fn any(&mut self, path: &str, route: impl Into<Route>) -> &mut Self {
        self.register(None, path, route)
    }

    /// Method-agnostic route that also catches every path below it
    pub fn all(&mut self, path: &str, route: impl Into<Route>) -> &mut Self {
        self.register(None, path, route.into().catch_all(true))
    }

    pub fn get(&mut self, path: &str, route: impl Into<Route>) -> &mut Self {
        self.register(Some(Method::Get), path, route)
    }

    pub fn post(&mut self, path: &str, route: impl Into<Route>) -> &mut Self {
        self.register(Some(Method::Post), path, route)
    }

    pub fn put(&mut self, path: &str, route: impl Into<Route>) -> &mut Self {
        self.register(Some(Method::Put), path, route)
    }

    pub fn delete(&mut self, path: &str, route: impl Into<Route>) -> &mut Self {
        self.register(Some(Method::Delete), path, route)
    }

    /// Append a middleware that runs for every request reaching this router
    pub fn attach(&mut self, middleware: Handler) -> &mut Self {
        self.root.middlewares.push(middleware);
        self
    }

    pub fn attach_all(&mut self, middlewares: impl IntoIterator<Item = Handler>) -> &mut Self {
        self.root.middlewares.extend(middlewares);
        self
    }

    pub const fn root(&self) -> &RouteNode {
        &self.root
    }

    pub fn into_root(self) -> RouteNode {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::key::RouteKey;
    use crate::routing::handler;

    fn noop() -> Handler {
        handler(|ex, _| async move { ex })
    }

    #[test]
    fn test_chain_form() {
        let route = Route::chain(vec![noop(), noop(), noop()]);
        assert_eq!(route.middlewares.len(), 2);
        assert!(route.handler.is_some());
        assert!(Route::chain(Vec::new()).handler.is_none());
    }

    #[test]
    fn test_method_registrations_use_distinct_keys() {
        let mut router = Router::new();
        router
            .get("item", noop())
            .post("item", noop())
            .put("item", noop())
            .delete("item", noop())
            .any("item", noop());

        let children = router.root().children().unwrap();
        assert_eq!(children.len(), 5);
        for method in [Method::Get, Method::Post, Method::Put, Method::Delete] {
            assert!(children.contains(&RouteKey::new("item", Some(method))));
        }
    }

    #[test]
    fn test_all_sets_catch_all() {
        let mut router = Router::new();
        router.all("/echo", noop()).any("plain", noop());

        let children = router.root().children().unwrap();
        assert!(children.get(&RouteKey::any("echo")).unwrap().is_catch_all());
        assert!(!children.get(&RouteKey::any("plain")).unwrap().is_catch_all());
    }

    #[test]
    fn test_options_argument() {
        let mut router = Router::new();
        router.any(
            "deepest",
            Route::to(noop()).options(RouteOptions { catch_all: false }),
        );
        router.any(
            "wide",
            Route::to(noop()).options(RouteOptions { catch_all: true }),
        );

        let children = router.root().children().unwrap();
        assert!(!children.get(&RouteKey::any("deepest")).unwrap().is_catch_all());
        assert!(children.get(&RouteKey::any("wide")).unwrap().is_catch_all());
    }

    #[test]
    fn test_attach_appends_top_level_middlewares() {
        let mut router = Router::new();
        router.attach(noop()).attach_all(vec![noop(), noop()]);
        assert_eq!(router.root().middlewares().len(), 3);
        assert!(!router.root().has_handler());
    }
}
