//! Monitor binary for the Seismon live event pipeline.
//!
//! This is the main entry point that wires together the upstream event
//! stream, the ingest loop, the gateway API server, and the optional
//! analytics backend. It loads configuration, assembles the shared
//! state, starts every task, and runs until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `seismon-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the analytics backend client (when configured)
//! 4. Assemble the shared application state
//! 5. Start the gateway HTTP server
//! 6. Backfill the live store from the backend
//! 7. Start the event stream (`WebSocket` or simulator)
//! 8. Start the ingest loop
//! 9. Wait for Ctrl-C, then tear down

mod error;
mod ingest;

use std::path::Path;
use std::sync::Arc;

use seismon_api::client::{BackendClient, EventQuery};
use seismon_core::config::{MonitorConfig, StreamMode};
use seismon_feed::channel::{self, StreamHandle};
use seismon_feed::simulator;
use seismon_gateway::startup::spawn_gateway;
use seismon_gateway::state::AppState;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::MonitorError;

/// Frames buffered between the stream task and the ingest loop.
const FRAME_CHANNEL_CAPACITY: usize = 256;

/// Events requested from the backend to seed the store at startup.
const BACKFILL_LIMIT: u32 = 20;

/// Application entry point for the monitor.
///
/// Initializes all subsystems and runs the pipeline until a shutdown
/// signal arrives.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_source) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG takes precedence over
    //    the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("seismon-monitor starting");
    info!(
        source = config_source,
        stream_mode = ?config.stream.mode,
        stream_url = config.stream.url,
        api_base_url = config.api.base_url,
        gateway_port = config.gateway.port,
        "configuration loaded"
    );

    // 3. Build the analytics backend client when configured.
    let backend = build_backend(&config)?;

    // 4. Assemble the shared application state.
    let mut state = AppState::new(config);
    state.backend = backend;
    let state = Arc::new(state);

    // 5. Start the gateway HTTP server.
    let _gateway_handle = spawn_gateway(&state.config.gateway, Arc::clone(&state)).await?;
    info!(
        host = state.config.gateway.host,
        port = state.config.gateway.port,
        "gateway server started"
    );

    // 6. Backfill the live store so the dashboard has history before
    //    the first live event arrives.
    if let Some(client) = &state.backend {
        backfill(client, &state).await;
    }

    // 7. Start the event stream.
    let stream_handle = Arc::new(StreamHandle::new());
    let (frames_tx, frames_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
    let stream_task = match state.config.stream.mode {
        StreamMode::Websocket => tokio::spawn(channel::run_channel(
            state.config.stream.url.clone(),
            frames_tx,
            Arc::clone(&stream_handle),
        )),
        StreamMode::Simulator => tokio::spawn(simulator::run_simulator(
            state.config.stream.simulator_interval_ms,
            frames_tx,
            Arc::clone(&stream_handle),
        )),
    };

    // 8. Start the ingest loop.
    let ingest_task = tokio::spawn(ingest::run_ingest(frames_rx, Arc::clone(&state)));
    info!("monitor running");

    // 9. Wait for the shutdown signal, then tear down: close the stream
    //    handle, stop any playback timer, and let the ingest loop drain.
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    stream_handle.close();
    state.playback.pause();

    if let Err(error) = stream_task.await {
        warn!(%error, "stream task did not stop cleanly");
    }
    if let Err(error) = ingest_task.await {
        warn!(%error, "ingest task did not stop cleanly");
    }

    info!("seismon-monitor shutdown complete");
    Ok(())
}

/// Load the monitor configuration and report where it came from.
///
/// The path comes from `SEISMON_CONFIG` when set; otherwise
/// `seismon-config.yaml` in the working directory is used when present,
/// and the built-in defaults (plus environment overrides) when not.
fn load_config() -> Result<(MonitorConfig, String), MonitorError> {
    if let Ok(path) = std::env::var("SEISMON_CONFIG") {
        let config = MonitorConfig::from_file(Path::new(&path))?;
        return Ok((config, path));
    }
    let config_path = Path::new("seismon-config.yaml");
    if config_path.exists() {
        let config = MonitorConfig::from_file(config_path)?;
        Ok((config, config_path.display().to_string()))
    } else {
        let mut config = MonitorConfig::default();
        config.apply_env_overrides();
        Ok((config, "defaults".to_owned()))
    }
}

/// Build the analytics backend client when one is configured.
///
/// An empty `api.base_url` disables the backend: the proxied routes
/// answer 503 and the live pipeline runs standalone.
fn build_backend(config: &MonitorConfig) -> Result<Option<Arc<BackendClient>>, MonitorError> {
    if config.api.base_url.is_empty() {
        info!("no analytics backend configured, proxied routes disabled");
        return Ok(None);
    }
    let client = BackendClient::new(&config.api)?;
    info!(base_url = client.base_url(), "analytics backend client ready");
    Ok(Some(Arc::new(client)))
}

/// Seed the live store with recent events from the backend.
///
/// Best effort: on failure the store starts empty and fills from the
/// stream. Events are inserted oldest first so arrival order in the
/// store matches chronology.
async fn backfill(client: &BackendClient, state: &AppState) {
    let query = EventQuery {
        limit: Some(BACKFILL_LIMIT),
        ..EventQuery::default()
    };
    match client.latest_events(&query).await {
        Ok(events) => {
            let count = events.len();
            {
                let mut store = state.store.write().await;
                for event in events.into_iter().rev() {
                    store.insert(event);
                }
            }
            state.refresh_track_len().await;
            info!(count, "live store backfilled from the backend");
        }
        Err(error) => {
            warn!(%error, "backfill failed, starting with an empty store");
        }
    }
}
