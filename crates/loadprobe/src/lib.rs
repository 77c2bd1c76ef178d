//! Top-level facade crate for loadprobe.
//!
//! Re-exports core types and the server library so users can depend on a single crate.

pub mod core {
    pub use loadprobe_core::*;
}

pub mod server {
    pub use loadprobe_server::*;
}
