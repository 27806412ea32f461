//! Per-bot session context
//!
//! Everything about one bot that outlives a single socket: its credential,
//! resumability record, store, and webhook routing.

use crate::protocol::{GatewayMessage, IdentifyPayload, IdentifyProperties, ResumePayload};
use crate::routing::EventDispatcher;
use relay_store::{SessionState, SessionStore};
use std::fmt;
use std::sync::Arc;

/// Session context for one bot
pub struct BotSession {
    name: String,
    token: String,
    state: SessionState,
    store: Arc<dyn SessionStore>,
    dispatcher: EventDispatcher,
}

impl BotSession {
    /// Create a session with an empty state; call [`load`](Self::load) before connecting
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        token: impl Into<String>,
        store: Arc<dyn SessionStore>,
        dispatcher: EventDispatcher,
    ) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            state: SessionState::new(),
            store,
            dispatcher,
        }
    }

    /// Read the persisted record for this credential
    pub async fn load(&mut self) {
        self.state = self.store.load(&self.token).await;
        tracing::info!(
            session_id = ?self.state.session_id,
            seq = ?self.state.seq,
            "Session state loaded"
        );
    }

    /// Write the current record through to the store
    ///
    /// Failures are logged and the session keeps going on in-memory state.
    pub async fn persist(&self) {
        if let Err(e) = self.store.save(&self.token, &self.state).await {
            tracing::warn!(error = %e, "Failed to persist session state");
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    #[must_use]
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Handshake frame for a fresh Hello: Resume if a session id is known, else Identify
    #[must_use]
    pub fn handshake(&self) -> GatewayMessage {
        match &self.state.session_id {
            Some(session_id) => GatewayMessage::resume(&ResumePayload {
                token: self.token.clone(),
                session_id: session_id.clone(),
                seq: self.state.seq,
            }),
            None => GatewayMessage::identify(&IdentifyPayload::new(
                self.token.clone(),
                IdentifyProperties::current(),
            )),
        }
    }
}

impl fmt::Debug for BotSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotSession")
            .field("name", &self.name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
