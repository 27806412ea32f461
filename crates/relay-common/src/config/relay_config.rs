//! Relay configuration structs
//!
//! Loads the multi-bot configuration from a JSON5 file with environment overrides.

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Config file used when neither `--config` nor `RELAY_CONFIG` is given
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Main relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Base URL of the REST API that serves gateway discovery
    pub api: String,
    /// Directory holding one session record per bot token
    #[serde(default, alias = "stateDir", alias = "statedir")]
    pub state_dir: Option<PathBuf>,
    /// Log every inbound gateway frame
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    pub bots: Vec<BotConfig>,
}

/// A single bot identity relayed by this process
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub name: String,
    pub token: String,
    #[serde(default)]
    pub webhooks: WebhookConfig,
}

/// Webhook routing rule for one bot
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub connected: Option<WebhookEndpoint>,
    #[serde(default)]
    pub disconnected: Option<WebhookEndpoint>,
    #[serde(default)]
    pub events: Option<WebhookEndpoint>,
    /// Event types forwarded under `events` (empty = all)
    #[serde(default)]
    pub include: Vec<String>,
    /// Event types never forwarded under `events`
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Destination of a webhook trigger
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookEndpoint {
    pub url: String,
}

impl WebhookEndpoint {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Reconnect pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ReconnectConfig {
    /// Delay before reconnecting after an established socket closed
    #[serde(default)]
    pub delay_ms: u64,
    /// First backoff step after a failed connect attempt
    #[serde(default = "default_failure_backoff_initial_ms")]
    pub failure_backoff_initial_ms: u64,
    /// Upper bound for the failed-connect backoff
    #[serde(default = "default_failure_backoff_max_ms")]
    pub failure_backoff_max_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay_ms: 0,
            failure_backoff_initial_ms: default_failure_backoff_initial_ms(),
            failure_backoff_max_ms: default_failure_backoff_max_ms(),
        }
    }
}

fn default_failure_backoff_initial_ms() -> u64 {
    500
}

fn default_failure_backoff_max_ms() -> u64 {
    30_000
}

impl RelayConfig {
    /// Resolve the config file path
    ///
    /// An explicit path wins, then `RELAY_CONFIG`, then [`DEFAULT_CONFIG_PATH`].
    #[must_use]
    pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        explicit
            .or_else(|| env::var("RELAY_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from a JSON5 file, applying `RELAY_*` overrides
    ///
    /// # Errors
    /// Returns an error if the file is missing, malformed, or fails validation
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Json5))
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        config.apply_env_overrides();
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(api) = env::var("RELAY_API") {
            self.api = api;
        }
        if let Ok(dir) = env::var("RELAY_STATE_DIR") {
            self.state_dir = Some(PathBuf::from(dir));
        }
        if let Ok(verbose) = env::var("RELAY_VERBOSE") {
            self.verbose = matches!(verbose.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Parse configuration from an in-memory JSON5 document
    ///
    /// # Errors
    /// Returns an error if the document is malformed or fails validation
    pub fn from_json5(source: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Json5))
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    fn normalize(&mut self) {
        for (index, bot) in self.bots.iter_mut().enumerate() {
            if bot.name.trim().is_empty() {
                bot.name = format!("bot-{index}");
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.trim().is_empty() {
            return Err(ConfigError::InvalidValue("api", "must not be empty".to_string()));
        }
        if self.bots.is_empty() {
            return Err(ConfigError::InvalidValue(
                "bots",
                "at least one bot is required".to_string(),
            ));
        }
        if let Some(bot) = self.bots.iter().find(|b| b.token.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(
                "bots.token",
                format!("bot '{}' has an empty token", bot.name),
            ));
        }
        if self.reconnect.failure_backoff_initial_ms > self.reconnect.failure_backoff_max_ms {
            return Err(ConfigError::InvalidValue(
                "reconnect.failure_backoff_initial_ms",
                "must not exceed failure_backoff_max_ms".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file {} not found (see config.json.example)", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
