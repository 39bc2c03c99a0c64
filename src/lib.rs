//! treeroute: an embeddable HTTP request router
//!
//! Routes are registered on a [`Router`] as a tree of path segments, each
//! optionally bound to a method. Requests walk the tree, collect the
//! middlewares they pass, and run them in order before the matched handler.
//! Unmatched requests fall back to static files, then to a JSON 404.
//!
//! ```no_run
//! use treeroute::{handler, App, Config, Exchange};
//!
//! # async fn run() -> treeroute::error::Result<()> {
//! let mut app = App::new(Config::default());
//! app.router().get("health", handler(|mut ex: Exchange, _| async move {
//!     ex.response.send_text("I am healthy");
//!     ex
//! }));
//! app.listen().await
//! # }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use app::App;
pub use config::Config;
pub use error::ServerError;
pub use http::{Exchange, Method, Request, Response};
pub use routing::{handler, Dispatcher, Handler, Next, Route, RouteOptions, Router};
