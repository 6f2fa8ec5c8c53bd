//! Application error types
//!
//! Errors that reach the process edge. Everything below the session state
//! machine is retried in place and never surfaces here.

use crate::config::ConfigError;
use crate::telemetry::TracingError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TracingError),

    // Bootstrap calls against the REST API (gateway url, shard count)
    #[error("Outbound API error: {0}")]
    Api(String),

    // Service registry conflicts
    #[error("Registration error: {0}")]
    Registration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Process exit code for this error (sysexits.h)
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            // EX_CONFIG
            Self::Config(_) | Self::Registration(_) => 78,
            // EX_UNAVAILABLE
            Self::Api(_) => 69,
            // EX_IOERR
            Self::Io(_) => 74,
            // EX_SOFTWARE
            Self::Telemetry(_) | Self::Internal(_) => 70,
        }
    }

    /// Wrap any error as an internal error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
