//! Request dispatch module
//!
//! Walks the frozen routing tree for a request, collects the middlewares met
//! on the way and runs the resulting chain. Requests that match nothing go to
//! the static file collaborator, then to a 404.

use super::chain::{BoxFuture, Chain, Handler};
use super::key::split_path;
use super::node::RouteNode;
use super::router::Router;
use crate::http::{Exchange, Method, Request, Response};
use crate::logger;
use std::sync::Arc;

/// Static file capability used as the fallback for unmatched requests
pub trait StaticFileServer: Send + Sync {
    /// Serve the file for `path` into `response`; `false` if there is none
    fn try_serve<'a>(&'a self, path: &'a str, response: &'a mut Response) -> BoxFuture<'a, bool>;
}

/// Fallback that never finds a file
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStaticFiles;

impl StaticFileServer for NoStaticFiles {
    fn try_serve<'a>(&'a self, _path: &'a str, _response: &'a mut Response) -> BoxFuture<'a, bool> {
        Box::pin(async { false })
    }
}

/// Node resolved for a request, with the middlewares accumulated to reach it
pub struct Resolved<'a> {
    pub node: &'a RouteNode,
    pub handler: Handler,
    pub middlewares: Vec<Handler>,
}

/// How a dispatched request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The chain reached the route handler
    Handled,
    /// A middleware returned without continuing; the handler never ran
    Halted,
    /// No route matched and a static file was served
    StaticFile,
    /// No route and no static file; a 404 was written
    NotFound,
}

/// Result of dispatching one request
#[derive(Debug)]
pub struct Dispatched {
    pub exchange: Exchange,
    pub outcome: Outcome,
}

/// Find the handler for `method` and `path` under `root`
///
/// Segments are looked up cumulatively so routes registered with a
/// multi-segment path (`"a/b/c"`) match as a single edge. A failed lookup on
/// the last segment fails the match unless the current node is catch-all.
pub fn resolve<'a>(root: &'a RouteNode, method: Method, path: &str) -> Option<Resolved<'a>> {
    let segments = split_path(path);
    let mut current = root;
    let mut middlewares = root.middlewares().to_vec();

    if segments.is_empty() {
        if let Some(child) = lookup(current, "", method) {
            current = child;
            middlewares.extend_from_slice(child.middlewares());
        }
    } else {
        let last = segments.len() - 1;
        let mut accumulated = String::new();

        for (i, segment) in segments.iter().enumerate() {
            if !accumulated.is_empty() {
                accumulated.push('/');
            }
            accumulated.push_str(segment);

            if let Some(child) = lookup(current, &accumulated, method) {
                current = child;
                middlewares.extend_from_slice(child.middlewares());
                accumulated.clear();
            } else if i == last && !current.is_catch_all() {
                return None;
            }
        }
    }

    // A sub-router mounted at a prefix may declare its own root handler
    if !current.has_handler() {
        if let Some(child) = lookup(current, "", method) {
            current = child;
            middlewares.extend_from_slice(child.middlewares());
        }
    }

    let handler = Arc::clone(current.handler()?);
    Some(Resolved {
        node: current,
        handler,
        middlewares,
    })
}

fn lookup<'a>(node: &'a RouteNode, path: &str, method: Method) -> Option<&'a RouteNode> {
    node.children()?.lookup(path, method)
}

/// Read-only routing tree plus its fallback, shared by all connections
#[derive(Clone)]
pub struct Dispatcher {
    root: Arc<RouteNode>,
    static_files: Arc<dyn StaticFileServer>,
}

impl Dispatcher {
    /// Freeze `router`; unmatched requests get a 404 directly
    pub fn new(router: Router) -> Self {
        Self::with_static_files(router, Arc::new(NoStaticFiles))
    }

    /// Freeze `router` with a static file fallback
    pub fn with_static_files(router: Router, static_files: Arc<dyn StaticFileServer>) -> Self {
        Self {
            root: Arc::new(router.into_root()),
            static_files,
        }
    }

    pub fn root(&self) -> &RouteNode {
        &self.root
    }

    pub fn resolve(&self, method: Method, path: &str) -> Option<Resolved<'_>> {
        resolve(&self.root, method, path)
    }

    /// Route `request` and run whatever it resolves to
    pub async fn dispatch(&self, request: Request) -> Dispatched {
        let method = request.method();
        let path = request.path().to_owned();
        let mut exchange = Exchange::new(request);

        if let Some(resolved) = self.resolve(method, &path) {
            logger::log_debug(&format!(
                "[Route] {method} {path} -> {} middleware(s)",
                resolved.middlewares.len()
            ));
            let chain = Chain::new(resolved.middlewares, resolved.handler);
            let exchange = chain.start(exchange).await;

            let outcome = if chain.handler_reached() {
                Outcome::Handled
            } else {
                if !exchange.response.is_sent() {
                    logger::log_chain_halted(exchange.request.id(), exchange.request.url());
                }
                Outcome::Halted
            };
            return Dispatched { exchange, outcome };
        }

        if self
            .static_files
            .try_serve(&path, &mut exchange.response)
            .await
        {
            return Dispatched {
                exchange,
                outcome: Outcome::StaticFile,
            };
        }

        logger::log_debug(&format!("[Route] {method} {path} -> not found"));
        exchange.response.send_not_found(exchange.request.url());
        Dispatched {
            exchange,
            outcome: Outcome::NotFound,
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").field("root", &self.root).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{handler, Next, Route};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    fn reply(text: &'static str) -> Handler {
        handler(move |mut ex: Exchange, _| async move {
            ex.response.send_text(text);
            ex
        })
    }

    fn tag(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Handler {
        let log = Arc::clone(log);
        handler(move |ex, next: Next| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(name);
                next.run(ex).await
            }
        })
    }

    async fn body_of(dispatcher: &Dispatcher, url: &str) -> (Outcome, String) {
        let done = dispatcher.dispatch(Request::get(url)).await;
        let text = done.exchange.response.text().unwrap_or_default().to_owned();
        (done.outcome, text)
    }

    #[tokio::test]
    async fn test_single_segment_routes_with_shared_prefix() {
        let mut router = Router::new();
        router
            .get("health", reply("healthy"))
            .get("healthcheck", reply("check"))
            .get("a", reply("A"))
            .get("a/b", reply("AB"));
        let dispatcher = Dispatcher::new(router);

        assert_eq!(body_of(&dispatcher, "/health").await.1, "healthy");
        assert_eq!(body_of(&dispatcher, "/healthcheck").await.1, "check");
        assert_eq!(body_of(&dispatcher, "/a").await.1, "A");
    }

    #[tokio::test]
    async fn test_multi_segment_literal_route() {
        let mut router = Router::new();
        router.any("a/b/c", reply("ABC"));
        let dispatcher = Dispatcher::new(router);

        assert_eq!(body_of(&dispatcher, "/a/b/c").await, (Outcome::Handled, "ABC".into()));
        assert_eq!(body_of(&dispatcher, "/a/b").await.0, Outcome::NotFound);
        assert_eq!(body_of(&dispatcher, "/a/b/c/d").await.0, Outcome::NotFound);
    }

    #[tokio::test]
    async fn test_multi_segment_literal_catch_all() {
        let mut router = Router::new();
        router.all("a/b/c", reply("ABC"));
        let dispatcher = Dispatcher::new(router);

        assert_eq!(body_of(&dispatcher, "/a/b/c/d").await.1, "ABC");
        assert_eq!(body_of(&dispatcher, "/a/b/c/d/e").await.1, "ABC");
        assert_eq!(body_of(&dispatcher, "/a/b").await.0, Outcome::NotFound);
    }

    #[tokio::test]
    async fn test_method_specific_routes() {
        let mut router = Router::new();
        router.post("form", reply("posted")).get("form", reply("fetched"));
        let dispatcher = Dispatcher::new(router);

        let post = Request::new(
            Method::Post,
            "/form",
            hyper::HeaderMap::new(),
            hyper::body::Bytes::new(),
        );
        let done = dispatcher.dispatch(post).await;
        assert_eq!(done.exchange.response.text(), Some("posted"));
        assert_eq!(body_of(&dispatcher, "/form").await.1, "fetched");

        let delete = Request::new(
            Method::Delete,
            "/form",
            hyper::HeaderMap::new(),
            hyper::body::Bytes::new(),
        );
        assert_eq!(dispatcher.dispatch(delete).await.outcome, Outcome::NotFound);
    }

    #[tokio::test]
    async fn test_root_path() {
        let mut router = Router::new();
        router.any("/", reply("home")).any("x", reply("x"));
        let dispatcher = Dispatcher::new(router);

        assert_eq!(body_of(&dispatcher, "/").await.1, "home");
        assert_eq!(body_of(&dispatcher, "").await.1, "home");
        assert_eq!(body_of(&dispatcher, "///").await.1, "home");
    }

    #[tokio::test]
    async fn test_root_path_without_route_is_not_found() {
        let dispatcher = Dispatcher::new(Router::new());
        let done = dispatcher.dispatch(Request::get("/")).await;
        assert_eq!(done.outcome, Outcome::NotFound);
        assert_eq!(done.exchange.response.status_code(), 404);
    }

    #[tokio::test]
    async fn test_prefix_mount_resolves_children_and_root_handler() {
        let mut api = Router::new();
        api.get("/", reply("API ROUTE")).get("x", reply("X"));
        let mut router = Router::new();
        router.any("/api", api);
        let dispatcher = Dispatcher::new(router);

        assert_eq!(body_of(&dispatcher, "/api").await.1, "API ROUTE");
        assert_eq!(body_of(&dispatcher, "/api/x").await.1, "X");
        assert_eq!(body_of(&dispatcher, "/api/y").await.0, Outcome::NotFound);
    }

    #[tokio::test]
    async fn test_middleware_order_across_levels() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut api = Router::new();
        api.attach(tag(&log, "api"));
        api.get("x", Route::chain(vec![tag(&log, "x"), reply("X")]));

        let mut router = Router::new();
        router.attach(tag(&log, "app"));
        router.any("api", Route::mount(api).middleware(tag(&log, "mount")));
        let dispatcher = Dispatcher::new(router);

        assert_eq!(body_of(&dispatcher, "/api/x").await.1, "X");
        assert_eq!(*log.lock().unwrap(), vec!["app", "mount", "api", "x"]);
    }

    #[tokio::test]
    async fn test_halting_middleware_skips_handler() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&reached);
        let guarded = handler(move |mut ex: Exchange, _| {
            let flag = Arc::clone(&flag);
            async move {
                flag.store(true, Ordering::SeqCst);
                ex.response.send_text("secret");
                ex
            }
        });
        let stall = handler(|ex, _next| async move { ex });

        let mut router = Router::new();
        router.get("secret", Route::chain(vec![stall, guarded]));
        let dispatcher = Dispatcher::new(router);

        let done = dispatcher.dispatch(Request::get("/secret")).await;
        assert_eq!(done.outcome, Outcome::Halted);
        assert!(!done.exchange.response.is_sent());
        assert!(!reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_short_circuit_response_is_kept() {
        let deny = handler(|mut ex: Exchange, _| async move {
            ex.response.status(401).send_text("denied");
            ex
        });
        let mut router = Router::new();
        router.attach(deny).get("x", reply("X"));
        let dispatcher = Dispatcher::new(router);

        let done = dispatcher.dispatch(Request::get("/x")).await;
        assert_eq!(done.outcome, Outcome::Halted);
        assert_eq!(done.exchange.response.status_code(), 401);
        assert_eq!(done.exchange.response.text(), Some("denied"));
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let dispatcher = Dispatcher::new(Router::new());
        let done = dispatcher.dispatch(Request::get("/nothing/here?x=1")).await;
        assert_eq!(done.outcome, Outcome::NotFound);
        assert_eq!(done.exchange.response.status_code(), 404);
        assert_eq!(
            done.exchange.response.header("content-type"),
            Some("application/json")
        );
        let body: serde_json::Value =
            serde_json::from_slice(done.exchange.response.body()).unwrap();
        assert_eq!(body, json!({"error": "NOT FOUND", "url": "/nothing/here?x=1"}));
    }

    struct FakeStatic;

    impl StaticFileServer for FakeStatic {
        fn try_serve<'a>(
            &'a self,
            path: &'a str,
            response: &'a mut Response,
        ) -> BoxFuture<'a, bool> {
            Box::pin(async move {
                if path == "/style.css" {
                    response.send_bytes("body {}", "text/css");
                    true
                } else {
                    false
                }
            })
        }
    }

    #[tokio::test]
    async fn test_static_fallback_gets_path_without_query() {
        let mut router = Router::new();
        router.get("x", reply("X"));
        let dispatcher = Dispatcher::with_static_files(router, Arc::new(FakeStatic));

        let (outcome, body) = body_of(&dispatcher, "/style.css?v=2").await;
        assert_eq!(outcome, Outcome::StaticFile);
        assert_eq!(body, "body {}");
        assert_eq!(body_of(&dispatcher, "/script.js").await.0, Outcome::NotFound);
    }

    #[test]
    fn test_resolve_reports_node() {
        let mut router = Router::new();
        router.all("echo", reply("echo"));
        let dispatcher = Dispatcher::new(router);

        let resolved = dispatcher.resolve(Method::Get, "/echo/hello/world").unwrap();
        assert!(resolved.node.is_catch_all());
        assert!(resolved.middlewares.is_empty());
        assert!(dispatcher.resolve(Method::Get, "/other").is_none());
    }
}
