//! Gateway URL discovery

use crate::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use serde::Deserialize;

/// Resolves the socket URL before the first connect
#[async_trait]
pub trait GatewayDiscovery: Send + Sync {
    /// Look up the gateway base URL
    async fn discover(&self) -> GatewayResult<String>;
}

#[derive(Debug, Deserialize)]
struct GatewayInfo {
    #[serde(default)]
    url: Option<String>,
}

/// Discovery through `GET {api}/gateway`
#[derive(Debug, Clone)]
pub struct HttpDiscovery {
    client: reqwest::Client,
    api: String,
}

impl HttpDiscovery {
    #[must_use]
    pub fn new(client: reqwest::Client, api: impl Into<String>) -> Self {
        Self {
            client,
            api: api.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/gateway", self.api.trim_end_matches('/'))
    }
}

#[async_trait]
impl GatewayDiscovery for HttpDiscovery {
    async fn discover(&self) -> GatewayResult<String> {
        let endpoint = self.endpoint();
        tracing::debug!(endpoint = %endpoint, "Discovering gateway");

        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| GatewayError::Discovery(format!("{endpoint}: {e}")))?;

        let info: GatewayInfo = response
            .json()
            .await
            .map_err(|e| GatewayError::Discovery(format!("{endpoint}: invalid body: {e}")))?;

        match info.url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(GatewayError::Discovery(format!(
                "{endpoint}: response has no url"
            ))),
        }
    }
}

/// Socket URL for a discovered gateway base URL
#[must_use]
pub fn socket_url(gateway_url: &str) -> String {
    format!("{}/?encoding=json", gateway_url.trim_end_matches('/'))
}
