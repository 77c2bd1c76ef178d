//! Shared error type across loadprobe crates.

use thiserror::Error;

/// Stable error codes, used in fault logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid configuration value.
    Config,
    /// A path was registered twice in the route table.
    DuplicateRoute,
    /// A handler computation failed.
    Compute,
    /// A response payload could not be serialized.
    Serialize,
    /// Anything else, including caught panics.
    Internal,
}

impl ErrorCode {
    /// String representation used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Config => "CONFIG",
            ErrorCode::DuplicateRoute => "DUPLICATE_ROUTE",
            ErrorCode::Compute => "COMPUTE",
            ErrorCode::Serialize => "SERIALIZE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LoadProbeError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum LoadProbeError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("duplicate route: {0}")]
    DuplicateRoute(String),
    #[error("computation failed: {0}")]
    Compute(String),
    #[error("serialization failed: {0}")]
    Serialize(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl LoadProbeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LoadProbeError::Config(_) => ErrorCode::Config,
            LoadProbeError::DuplicateRoute(_) => ErrorCode::DuplicateRoute,
            LoadProbeError::Compute(_) => ErrorCode::Compute,
            LoadProbeError::Serialize(_) => ErrorCode::Serialize,
            LoadProbeError::Internal(_) => ErrorCode::Internal,
        }
    }
}
