//! Application error types
//!
//! Errors that cross the process boundary. Everything that happens after a
//! session is established is absorbed and logged instead of surfacing here.

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    // Gateway discovery failed; the relay cannot start
    #[error("Gateway discovery failed: {0}")]
    Discovery(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get error code for log output
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Discovery(_) => "DISCOVERY_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Discovery(_) | Self::Internal(_) => 1,
        }
    }

    /// Create a discovery error
    #[must_use]
    pub fn discovery(msg: impl std::fmt::Display) -> Self {
        Self::Discovery(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
