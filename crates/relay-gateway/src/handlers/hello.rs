//! Hello handler (op 10)

use super::{Disconnect, HandlerResult};
use crate::connection::{BotSession, Connection, ConnectionState};
use crate::protocol::{HelloPayload, OpCode};
use std::time::Duration;

/// Starts the keepalive and opens the session
pub struct HelloHandler;

impl HelloHandler {
    /// Handle the server's Hello
    ///
    /// Sends Resume when a session id is stored, Identify otherwise.
    pub async fn handle(
        session: &BotSession,
        connection: &mut Connection,
        payload: HelloPayload,
    ) -> HandlerResult<Option<Disconnect>> {
        if payload.heartbeat_interval == 0 {
            tracing::warn!("Hello without a usable heartbeat interval; using the minimum");
        }
        let period = Duration::from_millis(payload.heartbeat_interval);
        connection.heartbeat_mut().start(period);

        let handshake = session.handshake();
        tracing::info!(
            heartbeat_interval_ms = payload.heartbeat_interval,
            resume = handshake.op == OpCode::Resume,
            "Gateway hello"
        );

        connection.send(handshake).await?;
        connection.set_state(ConnectionState::Handshaking);

        Ok(None)
    }
}
