//! Setup and listener errors

use thiserror::Error;

/// Errors that stop the server from starting or serving
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid listen address: {0}")]
    Address(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;
