//! HTTP layer module
//!
//! Request and response types handed through the middleware chain, plus the
//! body reader and query-string parser they rely on.

pub mod body;
pub mod method;
pub mod mime;
pub mod query;
pub mod request;
pub mod response;

pub use method::Method;
pub use request::Request;
pub use response::Response;

/// A request together with the response being written for it
///
/// Ownership of the exchange moves down the middleware chain and back up.
#[derive(Debug)]
pub struct Exchange {
    pub request: Request,
    pub response: Response,
}

impl Exchange {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: Response::new(),
        }
    }
}
