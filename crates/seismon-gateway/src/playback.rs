//! Playback control handlers for the timelapse API.
//!
//! These endpoints drive the shared [`PlaybackController`]: the gateway
//! validates requests and owns the policy (speed presets), while the
//! controller owns the state machine. A successful play spawns exactly
//! one timer task; every other transition is synchronous.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/playback` | Current playback status |
//! | `POST` | `/api/playback/play` | Start or resume playback |
//! | `POST` | `/api/playback/pause` | Pause, keeping the cursor |
//! | `POST` | `/api/playback/scrub` | Jump the cursor (forces a pause) |
//! | `POST` | `/api/playback/speed` | Set the tick interval (preset only) |
//!
//! [`PlaybackController`]: seismon_core::playback::PlaybackController

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use seismon_core::playback::run_playback;
use tracing::debug;

use crate::error::GatewayError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Request body for `POST /api/playback/scrub`.
#[derive(Debug, serde::Deserialize)]
pub struct ScrubRequest {
    /// Target cursor position; clamped to the track length.
    pub index: usize,
}

/// Request body for `POST /api/playback/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New tick interval in milliseconds; must match a configured preset.
    pub speed_ms: u64,
}

// ---------------------------------------------------------------------------
// GET /api/playback
// ---------------------------------------------------------------------------

/// Return the current playback status with a freshly bounded track.
pub async fn playback_status(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, GatewayError> {
    let _ = state.refresh_track_len().await;
    Ok(Json(state.playback.status()))
}

// ---------------------------------------------------------------------------
// POST /api/playback/play
// ---------------------------------------------------------------------------

/// Start or resume playback.
///
/// From idle the cursor restarts at zero; from a pause it resumes in
/// place. The timer task is spawned only when this call actually
/// started playback, so repeated play requests never race two timers.
pub async fn play(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, GatewayError> {
    let _ = state.refresh_track_len().await;
    if state.playback.play() {
        debug!("playback started, spawning timer task");
        tokio::spawn(run_playback(Arc::clone(&state.playback)));
    }
    Ok(Json(state.playback.status()))
}

// ---------------------------------------------------------------------------
// POST /api/playback/pause
// ---------------------------------------------------------------------------

/// Pause playback, keeping the cursor where it is.
pub async fn pause(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, GatewayError> {
    state.playback.pause();
    Ok(Json(state.playback.status()))
}

// ---------------------------------------------------------------------------
// POST /api/playback/scrub
// ---------------------------------------------------------------------------

/// Jump the cursor to an index, clamped to the track, and force a pause.
pub async fn scrub(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScrubRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let _ = state.refresh_track_len().await;
    state.playback.scrub(body.index);
    Ok(Json(state.playback.status()))
}

// ---------------------------------------------------------------------------
// POST /api/playback/speed
// ---------------------------------------------------------------------------

/// Set the playback tick interval.
///
/// Only the configured presets are accepted; anything else is rejected
/// with `400` and the current interval is left untouched. The new
/// interval applies from the next tick's sleep.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetSpeedRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let presets = &state.config.playback.speed_presets_ms;
    if !presets.contains(&body.speed_ms) {
        return Err(GatewayError::InvalidQuery(format!(
            "speed_ms must be one of {presets:?}"
        )));
    }

    state.playback.set_speed_ms(body.speed_ms).map_or_else(
        || {
            Err(GatewayError::InvalidQuery(
                "speed_ms must be positive".to_owned(),
            ))
        },
        |prev| {
            Ok(Json(serde_json::json!({
                "ok": true,
                "message": format!("playback speed changed from {prev}ms to {}ms", body.speed_ms),
                "previous_speed_ms": prev,
                "new_speed_ms": body.speed_ms,
            })))
        },
    )
}
