//! Gateway close codes
//!
//! The relay reconnects after every close; the code only decides how loudly
//! the close is logged.

/// How a server close is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseSeverity {
    /// Not a gateway code (normal closure, going away, ...)
    Routine,
    /// Gateway code after which a retry can be expected to work
    Recoverable,
    /// Gateway code blaming the bot's setup: token, shard, API version or intents
    Rejected,
}

impl CloseSeverity {
    /// Classify a raw close code
    #[must_use]
    pub const fn of(code: u16) -> Self {
        match code {
            4004 | 4010..=4014 => Self::Rejected,
            4000..=4999 => Self::Recoverable,
            _ => Self::Routine,
        }
    }
}
