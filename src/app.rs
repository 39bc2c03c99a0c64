//! Application entry point
//!
//! An [`App`] is a root [`Router`] plus the static folder, configuration and
//! listener that turn it into a running server.

use crate::config::Config;
use crate::error::Result;
use crate::handler::{ServiceState, StaticFiles};
use crate::logger;
use crate::routing::{Dispatcher, Router};
use crate::server;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct App {
    config: Config,
    router: Router,
    static_root: Option<PathBuf>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl App {
    pub fn new(config: Config) -> Self {
        let static_root = config
            .static_files
            .enabled
            .then(|| PathBuf::from(&config.static_files.dir));
        Self {
            config,
            router: Router::new(),
            static_root,
        }
    }

    /// Serve unmatched requests from `dir`, relative to the working directory
    pub fn static_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.static_root = Some(dir.into());
        self
    }

    /// The root router, for registering routes and top-level middlewares
    pub fn router(&mut self) -> &mut Router {
        &mut self.router
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Freeze the routes registered so far
    pub fn dispatcher(&self) -> Dispatcher {
        let router = self.router.clone();
        match &self.static_root {
            Some(root) => {
                let files = StaticFiles::new(root.clone())
                    .with_index_files(self.config.static_files.index_files.clone());
                Dispatcher::with_static_files(router, Arc::new(files))
            }
            None => Dispatcher::new(router),
        }
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM
    pub async fn listen(self) -> Result<()> {
        let addr = self.config.socket_addr()?;
        let listener = server::create_listener(addr)?;
        logger::log_server_start(&addr, &self.config);
        self.serve(listener, server::shutdown_signal()).await;
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let dispatcher = self.dispatcher();
        let state = Arc::new(ServiceState::new(dispatcher, self.config));
        server::serve(listener, state, shutdown).await;
    }
}
