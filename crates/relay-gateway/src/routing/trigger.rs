//! Webhook trigger
//!
//! Fire-and-forget delivery of relay notifications to configured HTTP endpoints.

use relay_common::{WebhookConfig, WebhookEndpoint};
use serde_json::Value;
use std::fmt;
use tracing::Instrument;

/// Trigger names a bot can route to an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookKind {
    /// Session established (READY or RESUMED)
    Connected,
    /// Socket closed
    Disconnected,
    /// Forwarded dispatch event
    Events,
}

impl WebhookKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Events => "events",
        }
    }
}

impl fmt::Display for WebhookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback trigger invoked by the session
///
/// `fire` must return without waiting for delivery; failures stay inside the
/// implementation.
pub trait WebhookTrigger: Send + Sync {
    /// Check if an endpoint is configured for this trigger
    fn is_configured(&self, kind: WebhookKind) -> bool;

    /// Deliver a payload, skipping silently when no endpoint is configured
    fn fire(&self, kind: WebhookKind, payload: Value);
}

/// Endpoint lookup by trigger name
#[derive(Debug, Clone, Default)]
pub struct WebhookRoutes {
    pub connected: Option<WebhookEndpoint>,
    pub disconnected: Option<WebhookEndpoint>,
    pub events: Option<WebhookEndpoint>,
}

impl WebhookRoutes {
    /// Endpoint for a trigger, if configured
    #[must_use]
    pub fn endpoint(&self, kind: WebhookKind) -> Option<&WebhookEndpoint> {
        match kind {
            WebhookKind::Connected => self.connected.as_ref(),
            WebhookKind::Disconnected => self.disconnected.as_ref(),
            WebhookKind::Events => self.events.as_ref(),
        }
    }
}

impl From<&WebhookConfig> for WebhookRoutes {
    fn from(config: &WebhookConfig) -> Self {
        Self {
            connected: config.connected.clone(),
            disconnected: config.disconnected.clone(),
            events: config.events.clone(),
        }
    }
}

/// Webhook trigger posting JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpWebhookTrigger {
    client: reqwest::Client,
    routes: WebhookRoutes,
}

impl HttpWebhookTrigger {
    /// Create a trigger sharing an HTTP client
    #[must_use]
    pub fn new(client: reqwest::Client, routes: WebhookRoutes) -> Self {
        Self { client, routes }
    }
}

impl WebhookTrigger for HttpWebhookTrigger {
    fn is_configured(&self, kind: WebhookKind) -> bool {
        self.routes.endpoint(kind).is_some()
    }

    fn fire(&self, kind: WebhookKind, payload: Value) {
        let Some(endpoint) = self.routes.endpoint(kind) else {
            return;
        };

        let request = self.client.post(&endpoint.url).json(&payload);
        let url = endpoint.url.clone();

        // Detached: the session never waits on delivery
        tokio::spawn(
            async move {
                match request.send().await {
                    Ok(response) if response.status().is_success() => {
                        tracing::debug!(status = %response.status(), "Webhook delivered");
                    }
                    Ok(response) => {
                        tracing::warn!(status = %response.status(), "Webhook rejected");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Webhook delivery failed");
                    }
                }
            }
            .instrument(tracing::debug_span!("webhook", kind = %kind, url = %url)),
        );
    }
}
