//! # relay-common
//!
//! Shared utilities including configuration, error handling, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    BotConfig, ConfigError, ReconnectConfig, RelayConfig, WebhookConfig, WebhookEndpoint,
    DEFAULT_CONFIG_PATH,
};
pub use error::{AppError, AppResult};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig, TracingError};
