//! Handler error types

use crate::protocol::GatewayMessage;
use thiserror::Error;
use tokio::sync::mpsc::error::SendError;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Frame payload did not match its opcode
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The writer task is gone, so the socket is dead
    #[error("Connection closed")]
    ConnectionClosed,
}

impl HandlerError {
    /// Check if the socket must be torn down
    #[must_use]
    pub const fn is_fatal_for_connection(&self) -> bool {
        matches!(self, Self::ConnectionClosed)
    }
}

impl From<SendError<GatewayMessage>> for HandlerError {
    fn from(_: SendError<GatewayMessage>) -> Self {
        Self::ConnectionClosed
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
