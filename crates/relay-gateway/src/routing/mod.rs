//! Webhook routing
//!
//! Decides which gateway events leave the process and hands them to the
//! webhook trigger.

mod dispatcher;
mod filter;
mod trigger;

pub use dispatcher::{EventDispatcher, RouteOutcome};
pub use filter::{EventFilter, FilterDecision};
pub use trigger::{HttpWebhookTrigger, WebhookKind, WebhookRoutes, WebhookTrigger};

#[cfg(test)]
pub(crate) use dispatcher::test_support;
