//! # relay-gateway
//!
//! Gateway session client that keeps a bot connected to the event gateway and
//! relays its events to HTTP webhooks.
//!
//! ## Modules
//!
//! - `protocol`: frame format, op codes, handshake payloads, close codes
//! - `connection`: socket handle, heartbeat manager, per-bot session context
//! - `handlers`: op code interpretation
//! - `routing`: include/exclude filtering and webhook triggers
//! - `client`: discovery, connect loop, multi-bot supervisor

pub mod client;
pub mod connection;
pub mod error;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod routing;

pub use client::{run, run_with_discovery, GatewayClient};
pub use error::{GatewayError, GatewayResult};
