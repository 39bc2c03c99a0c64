// Configuration module entry point
// Loads the server, logging and static file settings

mod types;

use crate::error::{Result, ServerError};
use std::net::SocketAddr;

pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, StaticFilesConfig,
};

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; `TREEROUTE__SECTION__KEY` environment variables
    /// override it.
    pub fn load_from(config_path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("TREEROUTE").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "simple")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.request_timeout", 30)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("http.server_name", "treeroute/0.1")?
            .set_default("static_files.enabled", true)?
            .set_default("static_files.dir", "public")?
            .set_default("static_files.index_files", vec!["index.html", "index.htm"])?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                ServerError::Address(format!("{}:{} ({e})", self.server.host, self.server.port))
            })
    }
}
