//! Heartbeat handlers (op 1 and op 11)

use super::{Disconnect, HandlerResult};
use crate::connection::{BotSession, Connection};

/// Handles server heartbeat requests and acknowledgements
pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Answer a server-initiated heartbeat request immediately
    pub async fn handle_request(
        session: &BotSession,
        connection: &mut Connection,
    ) -> HandlerResult<Option<Disconnect>> {
        tracing::debug!(seq = ?session.state().seq, "Heartbeat requested by server");
        connection.send_heartbeat(session.state().seq).await?;
        Ok(None)
    }

    /// Log the round-trip latency of the last heartbeat
    pub fn handle_ack(connection: &Connection) -> HandlerResult<Option<Disconnect>> {
        match connection.heartbeat().ack() {
            Some(latency) => {
                tracing::debug!(latency_ms = latency.as_millis() as u64, "Heartbeat acknowledged");
            }
            None => tracing::trace!("Heartbeat ack before any heartbeat was sent"),
        }
        Ok(None)
    }
}
