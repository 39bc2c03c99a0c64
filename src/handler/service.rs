//! Request service module
//!
//! Entry point for HTTP request processing: bounds and buffers the body, hands
//! the request to the dispatcher and turns the result into a hyper response.

use crate::config::Config;
use crate::http::{Method, Request, Response};
use crate::logger::{self, AccessLogEntry};
use crate::routing::{Dispatched, Dispatcher, Outcome};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, REFERER, USER_AGENT};
use serde_json::json;
use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;

/// Everything a connection needs to answer requests
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub dispatcher: Dispatcher,
    pub config: Arc<Config>,
}

impl ServiceState {
    pub fn new(dispatcher: Dispatcher, config: Config) -> Self {
        Self {
            dispatcher,
            config: Arc::new(config),
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: hyper::Request<B>,
    peer_addr: SocketAddr,
    state: Arc<ServiceState>,
) -> Result<hyper::Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let config = &state.config;
    let server_name = Some(config.http.server_name.as_str());

    // 1. Reject oversized bodies announced up front
    if let Some(resp) = check_body_size(&req, config.http.max_body_size) {
        return Ok(resp.into_hyper(server_name));
    }

    let (parts, body) = req.into_parts();
    let url = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_owned(), |pq| pq.as_str().to_owned());

    // 2. Buffer the body within the configured limit
    let limit = usize::try_from(config.http.max_body_size).unwrap_or(usize::MAX);
    let raw_body = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!(
                "Request body too large for {url} (max: {} bytes)",
                config.http.max_body_size
            ));
            return Ok(payload_too_large().into_hyper(server_name));
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body for {url}: {e}"));
            Bytes::new()
        }
    };

    let request = Request::new(Method::from_http(&parts.method), url, parts.headers, raw_body);

    // 3. Route
    let Dispatched {
        mut exchange,
        outcome,
    } = state.dispatcher.dispatch(request).await;

    // 4. A stalled chain still gets an answer; a handler that only set
    //    status and headers gets an empty body
    if !exchange.response.is_sent() {
        if outcome == Outcome::Halted {
            logger::log_warning(&format!(
                "[{}] No response written for {}",
                exchange.request.id(),
                exchange.request.url()
            ));
            exchange.response.send_no_response(exchange.request.url());
        } else {
            exchange.response.end();
        }
    }

    if config.logging.access_log {
        let entry = access_entry(&exchange.request, &exchange.response, peer_addr, parts.version);
        logger::log_access(&entry, &config.logging.access_log_format);
    }

    Ok(exchange.response.into_hyper(server_name))
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &hyper::Request<B>, max_body_size: u64) -> Option<Response> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(payload_too_large())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn payload_too_large() -> Response {
    let mut response = Response::new();
    response
        .status(413)
        .send_json(&json!({ "error": "PAYLOAD TOO LARGE" }));
    response
}

fn access_entry(
    request: &Request,
    response: &Response,
    peer_addr: SocketAddr,
    version: hyper::Version,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        request.id(),
        peer_addr.ip().to_string(),
        request.method().to_string(),
        request.url().to_owned(),
    );
    entry.http_version = version_str(version).to_string();
    entry.status = response.status_code();
    entry.body_bytes = response.body().len();
    entry.referer = request.header(REFERER.as_str()).map(ToString::to_string);
    entry.user_agent = request.header(USER_AGENT.as_str()).map(ToString::to_string);
    entry.request_time_us =
        u64::try_from(request.received_at().elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn version_str(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2.0",
        hyper::Version::HTTP_3 => "3.0",
        _ => "1.1",
    }
}
