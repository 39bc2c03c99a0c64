//! Middleware chain execution
//!
//! Middlewares and handlers share one signature: they receive the exchange and
//! a continuation. A middleware has to call [`Next::run`] for the rest of the
//! chain to execute; returning without doing so ends the chain right there.

use crate::http::Exchange;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Boxed future returned by handlers
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A middleware or a terminal handler
pub type Handler = Arc<dyn Fn(Exchange, Next) -> BoxFuture<'static, Exchange> + Send + Sync>;

/// Wrap an async function or closure into a [`Handler`]
///
/// ```
/// use treeroute::routing::{handler, Next};
/// use treeroute::http::Exchange;
///
/// let health = handler(|mut ex: Exchange, _next: Next| async move {
///     ex.response.send_text("I am healthy");
///     ex
/// });
/// # let _ = health;
/// ```
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Exchange, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Exchange> + Send + 'static,
{
    Arc::new(move |ex: Exchange, next: Next| -> BoxFuture<'static, Exchange> {
        Box::pin(f(ex, next))
    })
}

/// Middlewares collected for one request plus the handler they guard
pub(crate) struct Chain {
    middlewares: Vec<Handler>,
    handler: Handler,
    handler_reached: AtomicBool,
}

impl Chain {
    pub(crate) fn new(middlewares: Vec<Handler>, handler: Handler) -> Arc<Self> {
        Arc::new(Self {
            middlewares,
            handler,
            handler_reached: AtomicBool::new(false),
        })
    }

    pub(crate) fn handler_reached(&self) -> bool {
        self.handler_reached.load(Ordering::Acquire)
    }

    /// Run the chain from its first middleware
    pub(crate) fn start(self: &Arc<Self>, exchange: Exchange) -> BoxFuture<'static, Exchange> {
        Next {
            chain: Arc::clone(self),
            index: 0,
        }
        .run(exchange)
    }
}

/// Continuation handed to every middleware and handler
#[derive(Clone)]
pub struct Next {
    chain: Arc<Chain>,
    index: usize,
}

impl Next {
    /// Continue with the next middleware, or the handler after the last one.
    ///
    /// The continuation given to the handler itself does nothing.
    pub fn run(self, exchange: Exchange) -> BoxFuture<'static, Exchange> {
        let Self { chain, index } = self;
        let len = chain.middlewares.len();

        if index < len {
            let middleware = Arc::clone(&chain.middlewares[index]);
            return middleware(exchange, Self { chain, index: index + 1 });
        }

        if index == len {
            chain.handler_reached.store(true, Ordering::Release);
            let handler = Arc::clone(&chain.handler);
            return handler(exchange, Self { chain, index: len + 1 });
        }

        Box::pin(async move { exchange })
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("middlewares", &self.chain.middlewares.len())
            .finish()
    }
}
