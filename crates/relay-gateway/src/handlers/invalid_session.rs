//! Invalid Session handler (op 9)

use super::{Disconnect, HandlerResult};
use crate::connection::BotSession;

/// Drops the stored session so the next Hello identifies
pub struct InvalidSessionHandler;

impl InvalidSessionHandler {
    /// Clear and persist the session, then ask for the socket to be closed
    pub async fn handle(session: &mut BotSession) -> HandlerResult<Option<Disconnect>> {
        tracing::warn!(
            session_id = ?session.state().session_id,
            "Session invalidated by gateway"
        );

        session.state_mut().clear();
        session.persist().await;

        Ok(Some(Disconnect::InvalidSession))
    }
}
