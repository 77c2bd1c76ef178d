//! Dispatcher module exports.
//!
//! Re-exports the route table, endpoint trait and instrumented dispatcher so
//! downstream consumers can depend on this module directly.

pub mod dispatcher;
pub mod routes;

pub use dispatcher::Dispatcher;
pub use routes::{Endpoint, RouteTable, ROOT_PATH};
