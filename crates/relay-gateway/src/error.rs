//! Gateway client errors

use relay_common::AppError;
use thiserror::Error;

/// Errors that escape the gateway client
///
/// Everything after discovery is recovered by reconnecting; only these reach
/// the caller.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Gateway URL lookup failed
    #[error("Gateway discovery failed: {0}")]
    Discovery(String),

    /// Shared HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// A bot task panicked or was cancelled
    #[error("Bot task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Discovery(msg) => AppError::discovery(msg),
            other => AppError::internal(other),
        }
    }
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
