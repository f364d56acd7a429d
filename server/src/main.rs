use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use telchat_server::config::ServerConfig;
use telchat_server::engine::registry::RoomRegistry;
use telchat_server::line::listener::start_listener;

/// Line-oriented multi-room chat server.
#[derive(Parser, Debug)]
#[command(name = "telchat", about = "Line-oriented multi-room chat server")]
struct Cli {
    /// Port to listen on (overrides the port of the configured address).
    port: Option<u16>,

    /// Path to the TOML config file.
    #[arg(long, default_value = "telchat.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::load(&cli.config)?;
    if let Some(port) = cli.port {
        config.set_port(port);
    }
    let config = Arc::new(config);

    let registry = Arc::new(RoomRegistry::new());

    let listener = TcpListener::bind(&config.server.address)
        .await
        .with_context(|| format!("failed to bind {}", config.server.address))?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested, waiting for sessions (Ctrl-C again to exit now)");
            shutdown.cancel();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("forced exit");
            std::process::exit(130);
        }
    });

    info!(
        address = %config.server.address,
        default_room = %config.server.default_room,
        "telchat server starting"
    );
    start_listener(listener, registry, config, cancel).await;
    info!("telchat server stopped");

    Ok(())
}
