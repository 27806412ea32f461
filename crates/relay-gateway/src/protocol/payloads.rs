//! Handshake payload definitions
//!
//! Defines the payload structures exchanged while opening a session.

use serde::{Deserialize, Deserializer, Serialize};

/// Client name reported in Identify properties
pub const CLIENT_NAME: &str = "gateway-relay";

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    #[serde(deserialize_with = "millis_from_number")]
    pub heartbeat_interval: u64,
}

/// Accept any JSON number; fractions truncate and negatives read as zero
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn millis_from_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = f64::deserialize(deserializer)?;
    Ok(millis.max(0.0) as u64)
}

impl HelloPayload {
    /// Create a Hello payload with the given interval
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

/// Payload for op 2 (Identify)
///
/// Sent by the client to start a brand-new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Bot token
    pub token: String,

    /// Member count above which the server omits offline members
    pub large_threshold: u32,

    /// Whether the client supports packet compression
    pub compress: bool,

    /// Client connection properties
    pub properties: IdentifyProperties,
}

impl IdentifyPayload {
    /// Member threshold requested by this client
    pub const LARGE_THRESHOLD: u32 = 250;

    /// Create an Identify payload with this client's defaults
    #[must_use]
    pub fn new(token: impl Into<String>, properties: IdentifyProperties) -> Self {
        Self {
            token: token.into(),
            large_threshold: Self::LARGE_THRESHOLD,
            compress: false,
            properties,
        }
    }
}

/// Client connection properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Operating system
    #[serde(rename = "$os")]
    pub os: String,

    /// Browser or client name
    #[serde(rename = "$browser")]
    pub browser: String,

    /// Device type
    #[serde(rename = "$device")]
    pub device: String,
}

impl IdentifyProperties {
    /// Properties describing this process
    #[must_use]
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: CLIENT_NAME.to_string(),
            device: CLIENT_NAME.to_string(),
        }
    }
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self::current()
    }
}

/// Payload for op 6 (Resume)
///
/// Sent by the client to reattach to a disconnected session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Bot token
    pub token: String,

    /// Session ID to resume
    pub session_id: String,

    /// Last received sequence number
    pub seq: Option<u64>,
}
