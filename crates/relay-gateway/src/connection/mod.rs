//! Connection management
//!
//! Socket lifecycle, keepalive timer, and the per-bot session context.

mod connection;
mod heartbeat;
mod session;

pub use connection::{Connection, ConnectionState};
pub use heartbeat::{Heartbeat, MIN_HEARTBEAT_PERIOD};
pub use session::BotSession;
