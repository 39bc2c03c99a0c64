// Connection handling module
// Accepts a single TCP connection and serves it with hyper

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::handler::{self, ServiceState};
use crate::http::Response;
use crate::logger;

/// Keeps the active connection count accurate however the task ends
struct ConnectionGuard {
    counter: Arc<AtomicUsize>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Accept and process a connection, checking limits and logging.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<ServiceState>,
    conn_counter: &Arc<AtomicUsize>,
    shutdown: &watch::Receiver<bool>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);
    let guard = ConnectionGuard {
        counter: Arc::clone(conn_counter),
    };

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    if let Err(e) = stream.set_nodelay(true) {
        logger::log_warning(&format!("Failed to set TCP_NODELAY for {peer_addr}: {e}"));
    }
    logger::log_connection_accepted(&peer_addr);

    handle_connection(stream, peer_addr, Arc::clone(state), guard, shutdown.clone());
}

/// Serve one connection in a spawned task.
///
/// Each request is dispatched in a task of its own. Only the wait for it is
/// bounded by `performance.request_timeout`: a request that runs over is
/// answered with a 503 while its handler keeps running to completion.
/// When `shutdown` flips the connection finishes its in-flight request and
/// closes.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<ServiceState>,
    guard: ConnectionGuard,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        let _guard = guard;
        let io = TokioIo::new(stream);

        let timeout = Duration::from_secs(state.config.performance.request_timeout);
        let mut builder = http1::Builder::new();
        builder.keep_alive(state.config.performance.keep_alive);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&state);
                async move {
                    let server_name = state.config.http.server_name.clone();
                    let url = req.uri().to_string();
                    let task = tokio::spawn(handler::handle_request(req, peer_addr, state));
                    match tokio::time::timeout(timeout, task).await {
                        Ok(Ok(result)) => result,
                        Ok(Err(e)) => {
                            logger::log_error(&format!("Request task for {url} failed: {e}"));
                            Ok(failed(&url).into_hyper(Some(&server_name)))
                        }
                        Err(_) => {
                            logger::log_warning(&format!(
                                "Request {url} timed out after {} seconds",
                                timeout.as_secs()
                            ));
                            Ok::<_, Infallible>(timed_out(&url).into_hyper(Some(&server_name)))
                        }
                    }
                }
            }),
        );
        tokio::pin!(conn);

        let result = tokio::select! {
            result = conn.as_mut() => result,
            _ = shutdown.changed() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        };

        if let Err(err) = result {
            logger::log_connection_error(&err);
        }
    });
}

fn timed_out(url: &str) -> Response {
    let mut response = Response::new();
    response
        .status(503)
        .send_json(&json!({ "error": "REQUEST TIMEOUT", "url": url }));
    response
}

fn failed(url: &str) -> Response {
    let mut response = Response::new();
    response
        .status(500)
        .send_json(&json!({ "error": "INTERNAL ERROR", "url": url }));
    response
}
