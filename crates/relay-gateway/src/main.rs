//! Gateway relay entry point
//!
//! Run with:
//! ```bash
//! cargo run -p relay-gateway -- --config config.json
//! ```

use clap::Parser;
use relay_common::{try_init_tracing, AppError, AppResult, RelayConfig, TracingConfig};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Relay gateway events to HTTP webhooks
#[derive(Debug, Parser)]
#[command(name = "gateway-relay", version, about)]
struct Cli {
    /// Path to the JSON5 config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log every inbound frame
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let path = RelayConfig::resolve_path(cli.config.clone());
    let loaded = RelayConfig::load(&path);

    let verbose = cli.verbose || loaded.as_ref().is_ok_and(|c| c.verbose);
    let tracing_config = if verbose {
        TracingConfig::verbose()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = try_init_tracing(&tracing_config.with_json(cli.log_json)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let result = match loaded {
        Ok(mut config) => {
            config.verbose = verbose;
            run(config).await
        }
        Err(e) => Err(AppError::from(e)),
    };

    if let Err(e) = result {
        error!(error = %e, code = e.error_code(), config = %path.display(), "Relay failed");
        std::process::exit(e.exit_code());
    }
}

async fn run(config: RelayConfig) -> AppResult<()> {
    info!(bots = config.bots.len(), api = %config.api, "Starting gateway relay");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // Keep the sender alive: dropping it reads as shutdown
                warn!(error = %e, "Cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        }
    });

    relay_gateway::run(config, shutdown_rx).await?;

    info!("Gateway relay stopped");
    Ok(())
}
