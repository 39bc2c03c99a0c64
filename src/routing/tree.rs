//! Router tree module
//!
//! Maps route keys to child nodes. Keys are compared by value, so finding a
//! child is a plain hash lookup.

use super::key::RouteKey;
use super::node::RouteNode;
use crate::http::Method;
use std::collections::HashMap;

/// Edges out of one node
#[derive(Debug, Clone, Default)]
pub struct RouteTree {
    edges: HashMap<RouteKey, RouteNode>,
}

impl RouteTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an edge. An existing edge with an equal key is replaced.
    pub fn insert(&mut self, key: RouteKey, node: RouteNode) -> Option<RouteNode> {
        self.edges.insert(key, node)
    }

    pub fn get(&self, key: &RouteKey) -> Option<&RouteNode> {
        self.edges.get(key)
    }

    pub fn contains(&self, key: &RouteKey) -> bool {
        self.edges.contains_key(key)
    }

    /// Find `path` for `method`, method-agnostic edge first
    pub fn lookup(&self, path: &str, method: Method) -> Option<&RouteNode> {
        let key = RouteKey::normalized(path.to_owned(), None);
        if let Some(node) = self.edges.get(&key) {
            return Some(node);
        }
        self.edges.get(&key.with_method(method))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RouteKey, &RouteNode)> {
        self.edges.iter()
    }
}

impl IntoIterator for RouteTree {
    type Item = (RouteKey, RouteNode);
    type IntoIter = std::collections::hash_map::IntoIter<RouteKey, RouteNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler;

    fn leaf() -> RouteNode {
        RouteNode::leaf(handler(|ex, _| async move { ex }), Vec::new(), false)
    }

    #[test]
    fn test_last_write_wins() {
        let mut tree = RouteTree::new();
        assert!(tree.insert(RouteKey::any("a"), leaf()).is_none());
        let mut catch_all = leaf();
        catch_all.catch_all = true;
        assert!(tree.insert(RouteKey::any("/a/"), catch_all).is_some());
        assert_eq!(tree.len(), 1);
        assert!(tree.get(&RouteKey::any("a")).unwrap().is_catch_all());
    }

    #[test]
    fn test_lookup_prefers_method_agnostic_edge() {
        let mut tree = RouteTree::new();
        let mut agnostic = leaf();
        agnostic.catch_all = true;
        tree.insert(RouteKey::new("x", Some(Method::Get)), leaf());
        tree.insert(RouteKey::any("x"), agnostic);

        assert!(tree.lookup("x", Method::Get).unwrap().is_catch_all());
    }

    #[test]
    fn test_lookup_falls_back_to_method_edge() {
        let mut tree = RouteTree::new();
        tree.insert(RouteKey::new("form", Some(Method::Post)), leaf());

        assert!(tree.lookup("form", Method::Post).is_some());
        assert!(tree.lookup("form", Method::Get).is_none());
        assert!(tree.lookup("", Method::Post).is_none());
    }
}
