//! Gateway client
//!
//! Discovery, reconnect pacing, and the per-bot connect loop, plus the
//! supervisor that runs one client per configured bot.

mod discovery;
mod reconnect;
mod runner;

pub use discovery::{socket_url, GatewayDiscovery, HttpDiscovery};
pub use reconnect::ReconnectPolicy;
pub use runner::GatewayClient;

use crate::connection::BotSession;
use crate::error::GatewayResult;
use crate::routing::{EventDispatcher, EventFilter, HttpWebhookTrigger, WebhookRoutes};
use relay_common::{BotConfig, RelayConfig};
use relay_store::{FileSessionStore, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::Instrument;

/// Timeout for discovery and webhook requests
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client shared by discovery and every bot's webhooks
pub fn http_client() -> GatewayResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("gateway-relay/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Build the session context for one configured bot
#[must_use]
pub fn bot_session(
    bot: &BotConfig,
    http: reqwest::Client,
    store: Arc<dyn SessionStore>,
) -> BotSession {
    let trigger = HttpWebhookTrigger::new(http, WebhookRoutes::from(&bot.webhooks));
    let dispatcher = EventDispatcher::new(Arc::new(trigger), EventFilter::from(&bot.webhooks));
    BotSession::new(bot.name.clone(), bot.token.clone(), store, dispatcher)
}

/// Run every configured bot until shutdown
///
/// Discovery runs once up front and its failure is the only fatal error;
/// sessions recover from everything else by reconnecting.
pub async fn run(config: RelayConfig, shutdown: watch::Receiver<bool>) -> GatewayResult<()> {
    let http = http_client()?;
    let discovery = HttpDiscovery::new(http.clone(), config.api.clone());
    run_with_discovery(&config, &discovery, http, shutdown).await
}

/// [`run`] with an explicit discovery implementation
pub async fn run_with_discovery(
    config: &RelayConfig,
    discovery: &dyn GatewayDiscovery,
    http: reqwest::Client,
    shutdown: watch::Receiver<bool>,
) -> GatewayResult<()> {
    let gateway = discovery.discover().await?;
    let url = socket_url(&gateway);
    tracing::info!(url = %url, bots = config.bots.len(), "Gateway discovered");

    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(config.state_dir.clone()));

    let mut tasks = JoinSet::new();
    for bot in &config.bots {
        let session = bot_session(bot, http.clone(), store.clone());
        let client = GatewayClient::new(session, url.clone())
            .with_reconnect(&config.reconnect)
            .with_verbose(config.verbose);

        let span = tracing::info_span!("bot", bot = %bot.name);
        tasks.spawn(client.run(shutdown.clone()).instrument(span));
    }

    while let Some(joined) = tasks.join_next().await {
        let session = joined?;
        tracing::debug!(bot = session.name(), "Bot task finished");
    }

    Ok(())
}
