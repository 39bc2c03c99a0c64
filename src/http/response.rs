//! HTTP response module
//!
//! A response is written once by a middleware, a handler or a fallback, then
//! converted into a hyper response by the transport layer.

use super::mime;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, SERVER};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tokio::fs;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// Outgoing response under construction
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
    sent: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Empty, unsent response with status 200
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            sent: false,
        }
    }

    /// Set the status code used when the response is sent
    pub fn status(&mut self, code: u16) -> &mut Self {
        self.status = code;
        self
    }

    pub const fn status_code(&self) -> u16 {
        self.status
    }

    /// Set a header, replacing any previous value. Invalid names or values are
    /// logged and skipped.
    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => logger::log_warning(&format!("Invalid response header skipped: {name}")),
        }
        self
    }

    pub fn remove_header(&mut self, name: &str) -> &mut Self {
        self.headers.remove(name);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether a body has been sent
    pub const fn is_sent(&self) -> bool {
        self.sent
    }

    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8 text, if it is valid UTF-8
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Send `body` with the given Content-Type. Only the first send counts.
    pub fn send_bytes(&mut self, body: impl Into<Bytes>, content_type: &str) {
        if self.sent {
            logger::log_warning("Response already sent, ignoring second send");
            return;
        }
        self.set_header(CONTENT_TYPE.as_str(), content_type);
        self.body = body.into();
        self.sent = true;
    }

    /// Finish the response without a body, keeping status and headers
    ///
    /// Used for replies such as redirects or `204 No Content`.
    pub fn end(&mut self) {
        if self.sent {
            return;
        }
        self.body = Bytes::new();
        self.sent = true;
    }

    /// Send a plain text body
    pub fn send_text(&mut self, text: impl Into<String>) {
        let text: String = text.into();
        self.send_bytes(text, TEXT_PLAIN);
    }

    /// Send `value` serialized as JSON
    pub fn send_json<T: Serialize + ?Sized>(&mut self, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => self.send_bytes(body, APPLICATION_JSON),
            Err(e) => {
                logger::log_error(&format!("Failed to serialize JSON response: {e}"));
                self.status(500).send_bytes(Bytes::new(), TEXT_PLAIN);
            }
        }
    }

    /// Send the file at `path` with a Content-Type derived from its extension
    ///
    /// Returns `false` without touching the response if the file can't be read.
    pub async fn send_file(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match fs::read(path).await {
            Ok(content) => {
                let content_type =
                    mime::content_type(path.extension().and_then(|e| e.to_str()));
                self.send_bytes(content, content_type);
                true
            }
            Err(_) => false,
        }
    }

    /// 404 result for an unmatched request
    pub fn send_not_found(&mut self, url: &str) {
        self.status(404)
            .send_json(&json!({ "error": "NOT FOUND", "url": url }));
    }

    /// 500 result for a request whose chain finished without a response
    pub fn send_no_response(&mut self, url: &str) {
        self.status(500)
            .send_json(&json!({ "error": "NO RESPONSE", "url": url }));
    }

    /// Convert into a hyper response
    pub fn into_hyper(self, server_name: Option<&str>) -> hyper::Response<Full<Bytes>> {
        let status = self.status;
        let mut builder = hyper::Response::builder().status(status);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers);
            if let Some(name) = server_name.and_then(|n| HeaderValue::from_str(n).ok()) {
                headers.entry(SERVER).or_insert(name);
            }
        }

        builder.body(Full::new(self.body)).unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build {status} response: {e}"));
            let mut fallback = hyper::Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
    }
}
