//! HTTP method module
//!
//! The router only distinguishes four methods.

use std::fmt;

/// Request method as seen by the routing tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Map a hyper method onto the routing methods.
    ///
    /// Anything other than GET, PUT and DELETE is routed as POST.
    pub fn from_http(method: &hyper::Method) -> Self {
        match *method {
            hyper::Method::GET => Self::Get,
            hyper::Method::PUT => Self::Put,
            hyper::Method::DELETE => Self::Delete,
            _ => Self::Post,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_methods() {
        assert_eq!(Method::from_http(&hyper::Method::GET), Method::Get);
        assert_eq!(Method::from_http(&hyper::Method::PUT), Method::Put);
        assert_eq!(Method::from_http(&hyper::Method::DELETE), Method::Delete);
        assert_eq!(Method::from_http(&hyper::Method::POST), Method::Post);
    }

    #[test]
    fn test_unknown_methods_route_as_post() {
        assert_eq!(Method::from_http(&hyper::Method::PATCH), Method::Post);
        assert_eq!(Method::from_http(&hyper::Method::HEAD), Method::Post);
        assert_eq!(Method::from_http(&hyper::Method::OPTIONS), Method::Post);
    }
}
