//! Route node module

use super::chain::Handler;
use super::tree::RouteTree;

/// A unit of the routing tree
///
/// Nodes are built during setup and never mutated once the tree is handed to
/// a [`Dispatcher`](super::Dispatcher).
#[derive(Clone, Default)]
pub struct RouteNode {
    pub(crate) handler: Option<Handler>,
    pub(crate) children: Option<RouteTree>,
    pub(crate) middlewares: Vec<Handler>,
    pub(crate) catch_all: bool,
}

impl RouteNode {
    /// Leaf node running `middlewares` before `handler`
    pub fn leaf(handler: Handler, middlewares: Vec<Handler>, catch_all: bool) -> Self {
        Self {
            handler: Some(handler),
            children: None,
            middlewares,
            catch_all,
        }
    }

    pub const fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    pub const fn children(&self) -> Option<&RouteTree> {
        self.children.as_ref()
    }

    pub fn middlewares(&self) -> &[Handler] {
        &self.middlewares
    }

    /// Whether an unmatched path suffix is still dispatched to this node
    pub const fn is_catch_all(&self) -> bool {
        self.catch_all
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Child tree, created on first use
    pub(crate) fn children_mut(&mut self) -> &mut RouteTree {
        self.children.get_or_insert_with(RouteTree::new)
    }
}

impl std::fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteNode")
            .field("handler", &self.handler.is_some())
            .field("children", &self.children)
            .field("middlewares", &self.middlewares.len())
            .field("catch_all", &self.catch_all)
            .finish()
    }
}
