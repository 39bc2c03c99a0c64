//! Route keys and path normalization

use crate::http::Method;

/// Identity of an edge in the routing tree
///
/// `path` is one or more segments joined by `/`, or empty for the root of a
/// tree. A key without a method matches any method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    path: String,
    method: Option<Method>,
}

impl RouteKey {
    /// Key for `path` after normalization
    pub fn new(path: &str, method: Option<Method>) -> Self {
        Self {
            path: sanitize_path(path),
            method,
        }
    }

    /// Method-agnostic key
    pub fn any(path: &str) -> Self {
        Self::new(path, None)
    }

    /// Key for a path that is already normalized
    pub(crate) const fn normalized(path: String, method: Option<Method>) -> Self {
        Self { path, method }
    }

    /// Same path, bound to `method`
    #[must_use]
    pub fn with_method(self, method: Method) -> Self {
        Self {
            method: Some(method),
            ..self
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn method(&self) -> Option<Method> {
        self.method
    }

    /// Whether this key sits on the root of its tree
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

/// Split a path into its non-empty segments
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Rejoin a path without leading, trailing or repeated slashes
///
/// # Examples
/// ```
/// use treeroute::routing::key::sanitize_path;
/// assert_eq!(sanitize_path("/deep//deeper/"), "deep/deeper");
/// assert_eq!(sanitize_path("/"), "");
/// ```
pub fn sanitize_path(path: &str) -> String {
    split_path(path).join("/")
}
