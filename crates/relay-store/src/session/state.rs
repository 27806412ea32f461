//! Session state record

use serde::{Deserialize, Serialize};

/// Resumability data for one bot credential
///
/// Serialized as `{"session_id": "...", "seq": 42}`; absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Session ID issued by the gateway on READY
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Sequence number of the last dispatch received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

impl SessionState {
    /// Create an empty state (no prior session)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state for an established session
    #[must_use]
    pub fn with_session(session_id: impl Into<String>, seq: Option<u64>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            seq,
        }
    }

    /// Check if a Resume can be attempted
    #[must_use]
    pub fn is_resumable(&self) -> bool {
        self.session_id.is_some()
    }

    /// Overwrite the sequence watermark with the value from a dispatch
    ///
    /// The value is taken as-is, never compared with the previous one.
    pub fn record_sequence(&mut self, seq: Option<u64>) {
        self.seq = seq;
    }

    /// Forget the session so the next handshake identifies from scratch
    pub fn clear(&mut self) {
        self.session_id = None;
        self.seq = None;
    }

    /// Check if nothing is known about a prior session
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.session_id.is_none() && self.seq.is_none()
    }
}
