use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::engine::registry::RoomRegistry;

use super::connection::handle_connection;

/// Accept connections and spawn a handler task for each.
/// Stops accepting new connections when the cancellation token is triggered,
/// then waits for the sessions already running to end before returning.
pub async fn start_listener(
    listener: TcpListener,
    registry: Arc<RoomRegistry>,
    config: Arc<ServerConfig>,
    cancel: CancellationToken,
) {
    match listener.local_addr() {
        Ok(addr) => info!("chat listener started on {}", addr),
        Err(_) => info!("chat listener started"),
    }

    let mut sessions = JoinSet::new();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("chat listener shutting down");
                break;
            }
            Some(result) = sessions.join_next(), if !sessions.is_empty() => {
                log_session_exit(result);
            }
            result = listener.accept() => {
                match result {
                    Ok((stream, addr)) => {
                        let registry = registry.clone();
                        let config = config.clone();
                        let peer = addr.to_string();
                        sessions.spawn(handle_connection(stream, peer, registry, config));
                    }
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                    }
                }
            }
        }
    }
    drop(listener);

    if !sessions.is_empty() {
        info!(active = sessions.len(), "waiting for sessions to end");
    }
    while let Some(result) = sessions.join_next().await {
        log_session_exit(result);
    }
    info!("chat listener stopped");
}

fn log_session_exit(result: Result<(), JoinError>) {
    if let Err(e) = result {
        warn!(error = %e, "session task failed");
    }
}
