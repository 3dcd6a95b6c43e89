//! # gaveld
//!
//! Gavel auction server binary — wires together all crates and starts the
//! HTTP/WebSocket server.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gavel_core::{AuctionLimits, Coordinator};
use gavel_protocol::{CommandRegistry, register_all};
use gavel_server::websocket::EventBridge;
use gavel_server::{GavelServer, ServerConfig};
use gavel_settings::GavelSettings;

/// Gavel auction server.
#[derive(Parser, Debug)]
#[command(name = "gaveld", about = "Gavel live auction server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings; 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Path to an alternate settings file.
    #[arg(long)]
    settings: Option<PathBuf>,
}

/// CLI flags win over the settings file.
fn apply_cli_overrides(config: &mut ServerConfig, args: &Cli) {
    if let Some(host) = &args.host {
        config.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.port = port;
    }
}

/// Install the global subscriber: `GAVEL_LOG` wins over the settings level.
fn init_tracing(settings: &GavelSettings) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("GAVEL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.as_filter_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if settings.logging.json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.compact().try_init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Settings first: the log level lives there.
    let settings = match &args.settings {
        Some(path) => gavel_settings::load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => gavel_settings::load_settings().unwrap_or_default(),
    };
    init_tracing(&settings);
    let _ = gavel_settings::init_settings(settings.clone());

    let metrics_handle = gavel_server::metrics::install_recorder();

    let limits = AuctionLimits {
        min_time_limit_seconds: settings.auction.min_time_limit_seconds,
        max_time_limit_seconds: settings.auction.max_time_limit_seconds,
        history_limit: settings.auction.history_limit,
    };
    let coordinator = Coordinator::new(limits);

    let mut registry = CommandRegistry::new();
    register_all(&mut registry);
    let command_count = registry.commands().len();

    let mut config = ServerConfig::from_settings(&settings);
    apply_cli_overrides(&mut config, &args);

    let server = GavelServer::new(config, registry, coordinator.clone(), metrics_handle);

    // Event bridge: coordinator events → WebSocket clients
    let bridge = EventBridge::new(coordinator.subscribe(), server.broadcast().clone());
    let _bridge_handle = tokio::spawn(bridge.run());

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;

    tracing::info!(
        "Gavel auction house open at http://{addr} ({command_count} commands registered)"
    );

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server.shutdown().shutdown();
    let _ = handle.await;

    tracing::info!("Shutdown complete");
    Ok(())
}
