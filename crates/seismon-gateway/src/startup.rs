//! Gateway startup helper for embedding in the monitor binary.
//!
//! Provides [`spawn_gateway`] which launches the HTTP + `WebSocket`
//! server on a background Tokio task. The monitor calls this during
//! startup so the gateway runs concurrently with the ingest loop.

use std::sync::Arc;

use seismon_core::config::GatewayConfig;
use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the gateway server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the gateway HTTP server on a background Tokio task.
///
/// Returns a [`JoinHandle`] so the caller can manage the server's
/// lifecycle alongside the ingest loop. The server runs until the
/// Tokio runtime is shut down or the task is aborted.
///
/// # Errors
///
/// Returns [`StartupError::Server`] when the bind address is not
/// parseable. Bind failures on a parseable address surface as an error
/// log from the background task.
pub async fn spawn_gateway(
    config: &GatewayConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let server_config = ServerConfig::from(config);

    // Catch obvious misconfigurations before spawning the background
    // task; the actual bind happens inside start_server.
    let addr_str = format!("{}:{}", server_config.host, server_config.port);
    let _: std::net::SocketAddr = addr_str.parse().map_err(|e| {
        StartupError::Server(ServerError::Bind(format!(
            "invalid address {addr_str}: {e}"
        )))
    })?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&server_config, state).await {
            tracing::error!(error = %e, "gateway server exited with error");
        }
    });

    tracing::info!(port = config.port, "gateway server spawned on background task");

    Ok(handle)
}
