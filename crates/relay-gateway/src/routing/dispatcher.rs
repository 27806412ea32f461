//! Webhook dispatch policy
//!
//! Maps session lifecycle changes and forwarded events onto webhook triggers.

use super::{EventFilter, FilterDecision, WebhookKind, WebhookTrigger};
use crate::protocol::GatewayMessage;
use serde_json::{json, Value};
use std::sync::Arc;

/// What happened to a dispatch frame offered for forwarding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Sent to the `events` webhook
    Forwarded,
    /// Dropped by the exclude list
    Excluded,
    /// Dropped because the include list does not name it
    NotIncluded,
    /// No `events` webhook configured
    NoEventsHook,
    /// Frame has no event type
    Untyped,
}

/// Routes relay notifications to a webhook trigger
#[derive(Clone)]
pub struct EventDispatcher {
    trigger: Arc<dyn WebhookTrigger>,
    filter: EventFilter,
}

impl EventDispatcher {
    /// Create a dispatcher for one bot
    #[must_use]
    pub fn new(trigger: Arc<dyn WebhookTrigger>, filter: EventFilter) -> Self {
        Self { trigger, filter }
    }

    /// Session established
    pub fn connected(&self) {
        self.trigger.fire(WebhookKind::Connected, empty_body());
    }

    /// Socket closed
    pub fn disconnected(&self) {
        self.trigger.fire(WebhookKind::Disconnected, empty_body());
    }

    /// Offer a dispatch frame to the `events` webhook
    ///
    /// The webhook body is the whole frame, not just its `d` field.
    pub fn route_event(&self, message: &GatewayMessage) -> RouteOutcome {
        if !self.trigger.is_configured(WebhookKind::Events) {
            return RouteOutcome::NoEventsHook;
        }

        let Some(event_type) = message.t.as_deref() else {
            return RouteOutcome::Untyped;
        };

        match self.filter.evaluate(event_type) {
            FilterDecision::Forward => {
                self.trigger.fire(WebhookKind::Events, message.to_value());
                RouteOutcome::Forwarded
            }
            FilterDecision::Excluded => RouteOutcome::Excluded,
            FilterDecision::NotIncluded => RouteOutcome::NotIncluded,
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

fn empty_body() -> Value {
    json!({})
}
