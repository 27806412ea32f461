//! Dispatch handler (op 0)

use super::{Disconnect, HandlerResult};
use crate::connection::{BotSession, Connection, ConnectionState};
use crate::events::{LifecycleEvent, ReadyEvent};
use crate::protocol::GatewayMessage;

/// Tracks sequence and session changes, then forwards the event
pub struct DispatchHandler;

impl DispatchHandler {
    /// Handle a dispatched event
    pub async fn handle(
        session: &mut BotSession,
        connection: &mut Connection,
        message: &GatewayMessage,
    ) -> HandlerResult<Option<Disconnect>> {
        session.state_mut().record_sequence(message.s);

        match message.t.as_deref().and_then(LifecycleEvent::from_name) {
            Some(LifecycleEvent::Ready) => {
                let ready = ReadyEvent::from_payload(message.d.as_ref());
                if ready.session_id.is_none() {
                    tracing::warn!("READY without session_id; next reconnect will identify");
                }
                session.state_mut().session_id = ready.session_id;
                connection.set_state(ConnectionState::Established);

                tracing::info!(
                    session_id = ?session.state().session_id,
                    version = ?ready.v,
                    "Session ready"
                );
                session.dispatcher().connected();
            }
            Some(LifecycleEvent::Resumed) => {
                connection.set_state(ConnectionState::Established);
                tracing::info!(
                    session_id = ?session.state().session_id,
                    seq = ?session.state().seq,
                    "Session resumed"
                );
                session.dispatcher().connected();
            }
            None => {}
        }

        session.persist().await;

        let outcome = session.dispatcher().route_event(message);
        tracing::debug!(event_type = ?message.t, seq = ?message.s, ?outcome, "Event routed");

        Ok(None)
    }
}
