//! Routing module
//!
//! The resolution engine of the crate:
//! - Route keys and nodes forming the routing tree
//! - Registration and sub-router composition
//! - Path walking, middleware accumulation and chain execution

pub mod chain;
pub mod compose;
pub mod dispatch;
pub mod key;
pub mod node;
pub mod router;
pub mod tree;

pub use chain::{handler, BoxFuture, Handler, Next};
pub use dispatch::{Dispatched, Dispatcher, NoStaticFiles, Outcome, Resolved, StaticFileServer};
pub use key::RouteKey;
pub use node::RouteNode;
pub use router::{Route, RouteOptions, Router};
pub use tree::RouteTree;
