//! Lifecycle event payloads

use serde::Deserialize;
use serde_json::Value;

/// READY event payload
///
/// Only the fields the relay needs; the rest of the payload is forwarded as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadyEvent {
    /// Gateway protocol version
    #[serde(default)]
    pub v: Option<u32>,

    /// Session ID for resuming
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ReadyEvent {
    /// Extract the READY fields from a dispatch payload
    ///
    /// Malformed payloads yield an empty event rather than an error.
    #[must_use]
    pub fn from_payload(data: Option<&Value>) -> Self {
        data.and_then(|d| serde_json::from_value(d.clone()).ok())
            .unwrap_or_default()
    }
}
