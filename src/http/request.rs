//! Request wrapper handed to middlewares and handlers

use super::body::read_body;
use super::method::Method;
use super::query::{parse_query, split_target};
use hyper::body::Bytes;
use hyper::header::{HeaderMap, CONTENT_TYPE};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// An incoming request with its body fully buffered
#[derive(Debug)]
pub struct Request {
    id: u64,
    method: Method,
    url: String,
    path_len: usize,
    query: HashMap<String, String>,
    headers: HeaderMap,
    raw_body: Bytes,
    body: OnceLock<Option<Value>>,
    received_at: Instant,
}

impl Request {
    /// Build a request from its parts. `url` is the raw request target.
    pub fn new(
        method: Method,
        url: impl Into<String>,
        headers: HeaderMap,
        raw_body: Bytes,
    ) -> Self {
        let url = url.into();
        let (path, query) = split_target(&url);
        let path_len = path.len();
        let query = query.map(parse_query).unwrap_or_default();

        Self {
            id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            method,
            url,
            path_len,
            query,
            headers,
            raw_body,
            body: OnceLock::new(),
            received_at: Instant::now(),
        }
    }

    /// Bodiless request, mostly useful in tests
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url, HeaderMap::new(), Bytes::new())
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    pub const fn method(&self) -> Method {
        self.method
    }

    /// Raw request target, query string included
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path portion of the target, not percent-decoded
    pub fn path(&self) -> &str {
        &self.url[..self.path_len]
    }

    pub const fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub const fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    /// Parsed body, computed on first access
    pub fn body(&self) -> Option<&Value> {
        self.body
            .get_or_init(|| read_body(self.content_type(), &self.raw_body, self.id))
            .as_ref()
    }

    pub const fn received_at(&self) -> Instant {
        self.received_at
    }
}
