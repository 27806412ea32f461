//! Gateway events
//!
//! Session lifecycle events the relay interprets. Every other dispatch is
//! forwarded opaquely.

mod event_types;
mod payloads;

pub use event_types::LifecycleEvent;
pub use payloads::ReadyEvent;
