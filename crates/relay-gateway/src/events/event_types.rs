//! Lifecycle event types
//!
//! Event names in the `t` field of dispatch messages that change session state.

use std::fmt;

/// Dispatch events that affect the session itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Sent after successful Identify, carries the new session ID
    Ready,
    /// Sent after successful Resume
    Resumed,
}

impl LifecycleEvent {
    /// Get the string representation of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Resumed => "RESUMED",
        }
    }

    /// Parse a lifecycle event from a dispatch event name
    ///
    /// Returns `None` for every event the relay passes through untouched.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "READY" => Some(Self::Ready),
            "RESUMED" => Some(Self::Resumed),
            _ => None,
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
