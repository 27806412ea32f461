//! Configuration structs

mod relay_config;

pub use relay_config::{
    BotConfig, ConfigError, ReconnectConfig, RelayConfig, WebhookConfig, WebhookEndpoint,
    DEFAULT_CONFIG_PATH,
};
