//! Request handler module
//!
//! Glue between hyper connections and the routing dispatcher, plus the static
//! file fallback used for unmatched requests.

pub mod service;
pub mod static_files;

// Re-export main entry point
pub use service::{handle_request, ServiceState};
pub use static_files::StaticFiles;
