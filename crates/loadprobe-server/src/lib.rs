//! loadprobe server library entry.
//!
//! Wires config, the metrics registry, the route table, and the instrumented
//! dispatcher into an axum service. It is intended to be consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod obs;
pub mod router;
pub mod transport;
