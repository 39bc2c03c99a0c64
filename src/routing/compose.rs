//! Composition of routes into a parent node
//!
//! Leaf routes become single nodes. Sub-routers mounted under a prefix become
//! one node carrying the whole sub-tree; sub-routers mounted at the root are
//! flattened onto the parent instead.

use super::chain::Handler;
use super::key::{sanitize_path, RouteKey};
use super::node::RouteNode;
use super::router::{Route, Router};
use crate::http::Method;
use crate::logger;

/// Register `route` under `path` on `parent`
pub fn attach(parent: &mut RouteNode, method: Option<Method>, path: &str, route: Route) {
    let key = RouteKey::normalized(sanitize_path(path), method);
    let Route {
        middlewares,
        handler,
        router,
        options,
    } = route;

    match (router, handler) {
        (Some(router), handler) if key.is_root() => {
            flatten_root_mount(parent, key, middlewares, handler, router, options.catch_all);
        }
        (Some(router), handler) => {
            mount_at_prefix(parent, key, middlewares, handler, router, options.catch_all);
        }
        (None, Some(handler)) => {
            parent
                .children_mut()
                .insert(key, RouteNode::leaf(handler, middlewares, options.catch_all));
        }
        (None, None) => {
            logger::log_warning(&format!(
                "Route '{}' registered without a handler or router, ignored",
                key.path()
            ));
        }
    }
}

/// Install a sub-router as a single child node at a non-empty prefix
///
/// The attaching call's middlewares run ahead of the sub-router's own.
fn mount_at_prefix(
    parent: &mut RouteNode,
    key: RouteKey,
    middlewares: Vec<Handler>,
    handler: Option<Handler>,
    router: Router,
    catch_all: bool,
) {
    let sub = router.into_root();
    let node = RouteNode {
        handler,
        children: sub.children,
        middlewares: prepend(middlewares, sub.middlewares),
        catch_all,
    };
    parent.children_mut().insert(key, node);
}

/// Re-parent every direct child of `router` onto `parent`
///
/// Each moved child keeps its key and gets the attaching call's middlewares,
/// then the sub-router's own, in front of its list. A handler given with the
/// mount lands on `parent` under the root key (`key`, with its method).
pub fn flatten_root_mount(
    parent: &mut RouteNode,
    key: RouteKey,
    middlewares: Vec<Handler>,
    handler: Option<Handler>,
    router: Router,
    catch_all: bool,
) {
    debug_assert!(key.is_root());
    let sub = router.into_root();
    let prefix = prepend(middlewares, sub.middlewares);
    let children = parent.children_mut();

    for (child_key, mut child) in sub.children.unwrap_or_default() {
        child.middlewares = prepend(prefix.clone(), child.middlewares);
        children.insert(child_key, child);
    }

    if let Some(handler) = handler {
        children.insert(key, RouteNode::leaf(handler, prefix, catch_all));
    }
}

fn prepend(mut front: Vec<Handler>, back: Vec<Handler>) -> Vec<Handler> {
    front.extend(back);
    front
}
