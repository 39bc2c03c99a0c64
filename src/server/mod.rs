// Server module entry point
// Listener creation, the accept loop and per-connection serving

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::handler::ServiceState;
use crate::logger;

pub use listener::create_listener;
pub use signal::shutdown_signal;

/// Accept connections on `listener` until `shutdown` resolves
///
/// After shutdown no new connections are accepted and every open connection
/// is told to close once its in-flight request is answered. Idle keep-alive
/// connections close at once; busy ones get up to one request timeout.
pub async fn serve<F>(listener: TcpListener, state: Arc<ServiceState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    let (closing_tx, closing_rx) = watch::channel(false);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                            &closing_rx,
                        );
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    closing_tx.send_replace(true);
    logger::log_server_stop();

    let grace = Duration::from_secs(state.config.performance.request_timeout);
    let drained = tokio::time::timeout(grace, async {
        while active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    })
    .await;

    if drained.is_err() {
        logger::log_warning(&format!(
            "{} connection(s) still open after {} seconds, closing",
            active_connections.load(Ordering::SeqCst),
            grace.as_secs()
        ));
    }
}
