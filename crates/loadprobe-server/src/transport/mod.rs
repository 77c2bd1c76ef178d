//! Transport layer (HTTP/1.1 via axum).
//!
//! Turns requests into dispatcher calls and handler replies into wire
//! responses.

pub mod http;
