//! Op code handlers
//!
//! Interprets inbound gateway frames based on their operation code.

mod dispatch;
mod error;
mod heartbeat;
mod hello;
mod invalid_session;

pub use dispatch::DispatchHandler;
pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;
pub use hello::HelloHandler;
pub use invalid_session::InvalidSessionHandler;

use crate::connection::{BotSession, Connection};
use crate::protocol::{GatewayMessage, OpCode};
use std::fmt;

/// Reason a handler asks for the socket to be dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disconnect {
    /// Server sent op 7
    Reconnect,
    /// Server sent op 9; the stored session has been cleared
    InvalidSession,
}

impl fmt::Display for Disconnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reconnect => f.write_str("reconnect requested"),
            Self::InvalidSession => f.write_str("invalid session"),
        }
    }
}

/// Dispatch incoming server frames to the appropriate handlers
pub struct FrameDispatcher;

impl FrameDispatcher {
    /// Handle one inbound frame
    ///
    /// Returns `Some` when the socket must be closed and reopened.
    pub async fn dispatch(
        session: &mut BotSession,
        connection: &mut Connection,
        message: GatewayMessage,
    ) -> HandlerResult<Option<Disconnect>> {
        match message.op {
            OpCode::Hello => {
                let payload = message.as_hello().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Hello payload".to_string())
                })?;

                HelloHandler::handle(session, connection, payload).await
            }
            OpCode::Dispatch => DispatchHandler::handle(session, connection, &message).await,
            OpCode::Heartbeat => HeartbeatHandler::handle_request(session, connection).await,
            OpCode::HeartbeatAck => HeartbeatHandler::handle_ack(connection),
            OpCode::InvalidSession => InvalidSessionHandler::handle(session).await,
            OpCode::Reconnect => {
                tracing::info!("Gateway requested reconnect");
                Ok(Some(Disconnect::Reconnect))
            }
            op => {
                tracing::debug!(op = %op, "Ignoring op code");
                Ok(None)
            }
        }
    }
}
