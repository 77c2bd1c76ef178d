//! loadprobe core: transport-agnostic handler contract and error types.
//!
//! This crate defines the `Reply` every endpoint produces and the error surface
//! shared by the server and its tests. It carries no runtime or HTTP
//! dependencies so the handler contract can be exercised in isolation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths must surface as `LoadProbeError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod reply;

/// Shared result type.
pub use error::{ErrorCode, LoadProbeError, Result};
pub use reply::Reply;
