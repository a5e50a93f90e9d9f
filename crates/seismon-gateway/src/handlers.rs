//! REST endpoint handlers for the live pipeline state.
//!
//! All handlers read from the shared [`AppState`]. The event list,
//! filter, layers, and playback status are served from memory; nothing
//! here touches the analytics backend (see [`crate::proxy`] for that).
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/status` | Pipeline health summary |
//! | `GET` | `/api/events` | Newest-first event feed |
//! | `GET` | `/api/events/visible` | Filtered, time-sorted playback view |
//! | `GET` | `/api/clusters` | Grid clusters over the visible view |
//! | `GET`/`PUT` | `/api/filters` | Read or replace the active filter |
//! | `GET`/`PUT` | `/api/layers` | Read or replace the layer toggles |

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use axum::Json;
use seismon_types::{FilterConfig, LayerToggles};

use crate::error::GatewayError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/events` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct EventsQuery {
    /// Maximum number of events to return (default: the feed capacity).
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing pipeline status and API links.
///
/// This is the fallback surface when the map dashboard is not running.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.store.read().await;
    let event_count = store.len();
    let capacity = store.capacity();
    drop(store);
    let alert_count = state.alerts.read().await.len();
    let playback = state.playback.status();
    let mode = if playback.playing {
        "PLAYING"
    } else if playback.idle {
        "LIVE"
    } else {
        "PAUSED"
    };
    let speed_ms = playback.speed_ms;
    let backend = if state.backend.is_some() {
        "configured"
    } else {
        "absent"
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Seismon Gateway</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        ul.get li::before {{ content: "GET "; color: #7ee787; font-weight: bold; }}
        ul.post li::before {{ content: "POST "; color: #d2a8ff; font-weight: bold; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Seismon Gateway</h1>
    <p class="subtitle">Live seismic event pipeline</p>

    <p>Status: <span class="status">RUNNING</span></p>

    <div>
        <div class="metric">
            <div class="label">Events</div>
            <div class="value">{event_count}/{capacity}</div>
        </div>
        <div class="metric">
            <div class="label">Alerts</div>
            <div class="value">{alert_count}</div>
        </div>
        <div class="metric">
            <div class="label">Playback</div>
            <div class="value">{mode}</div>
        </div>
        <div class="metric">
            <div class="label">Speed</div>
            <div class="value">{speed_ms}ms</div>
        </div>
        <div class="metric">
            <div class="label">Backend</div>
            <div class="value">{backend}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul class="get">
        <li><a href="/api/status">/api/status</a> -- Pipeline health summary</li>
        <li><a href="/api/events">/api/events</a> -- Newest-first event feed (?limit=N)</li>
        <li><a href="/api/events/visible">/api/events/visible</a> -- Filtered playback view</li>
        <li><a href="/api/clusters">/api/clusters</a> -- Grid + server clusters</li>
        <li><a href="/api/filters">/api/filters</a> -- Active filter (PUT to replace)</li>
        <li><a href="/api/layers">/api/layers</a> -- Layer toggles (PUT to replace)</li>
        <li><a href="/api/playback">/api/playback</a> -- Playback status</li>
        <li><a href="/api/alerts">/api/alerts</a> -- Alert history</li>
        <li><a href="/api/heatmap">/api/heatmap</a> -- Normalized heat samples (backend)</li>
        <li><a href="/api/analytics/trends">/api/analytics/:kind</a> -- Chart payloads (backend)</li>
        <li><a href="/api/graph">/api/graph</a> -- Relationship graph (backend)</li>
        <li><a href="/api/clustering/config">/api/clustering/config</a> -- Clustering config</li>
    </ul>

    <h2>Playback Control</h2>
    <ul class="post">
        <li>/api/playback/play</li>
        <li>/api/playback/pause</li>
        <li>/api/playback/scrub -- {{"index": N}}</li>
        <li>/api/playback/speed -- {{"speed_ms": N}}</li>
        <li>/api/alerts/:id/ack</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li style="list-style:none;"><code>ws://host:port/ws/feed</code> -- Live event and alert frames</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/status -- pipeline health summary
// ---------------------------------------------------------------------------

/// Return a summary of the pipeline state: store fill, alert count,
/// subscriber count, active filter, layers, and playback status.
pub async fn status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, GatewayError> {
    let store = state.store.read().await;
    let events = store.len();
    let capacity = store.capacity();
    drop(store);

    let filter = *state.filter.read().await;
    let layers = *state.layers.read().await;
    let alerts = state.alerts.read().await.len();

    Ok(Json(serde_json::json!({
        "events": events,
        "capacity": capacity,
        "alerts": alerts,
        "subscribers": state.tx.receiver_count(),
        "backend_configured": state.backend.is_some(),
        "filter": filter,
        "layers": layers,
        "playback": state.playback.status(),
    })))
}

// ---------------------------------------------------------------------------
// GET /api/events -- newest-first event feed
// ---------------------------------------------------------------------------

/// Return the newest events in arrival order, newest first.
///
/// This is the feed-panel view; it ignores the filter and playback
/// window. Use `/api/events/visible` for the map view.
///
/// # Query Parameters
///
/// - `limit`: Maximum number of events (default: configured feed
///   capacity, capped at the store capacity).
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let store = state.store.read().await;
    let limit = params
        .limit
        .unwrap_or(state.config.store.feed_capacity)
        .min(store.capacity());
    let events = store.newest(limit);

    Ok(Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/events/visible -- filtered playback view
// ---------------------------------------------------------------------------

/// Return the filtered, time-ascending event list the map renders.
///
/// When playback is idle this is the whole filtered snapshot; during
/// playback or while paused it is the prefix below the cursor.
pub async fn visible_events(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, GatewayError> {
    let events = state.visible_events().await;

    Ok(Json(serde_json::json!({
        "count": events.len(),
        "events": events,
        "playback": state.playback.status(),
    })))
}

// ---------------------------------------------------------------------------
// GET /api/clusters -- grid clusters over the visible view
// ---------------------------------------------------------------------------

/// Return grid clusters computed over the visible events, plus the last
/// authoritative backend snapshot when one has been fetched.
pub async fn clusters(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, GatewayError> {
    let events = state.visible_events().await;
    let grid = seismon_core::grid::cluster(&events, state.config.clustering.cell_size_deg);
    let server = state.server_clusters.read().await.clone();

    Ok(Json(serde_json::json!({
        "count": grid.len(),
        "clusters": grid,
        "server": server,
    })))
}

// ---------------------------------------------------------------------------
// GET/PUT /api/filters -- the active event filter
// ---------------------------------------------------------------------------

/// Return the active filter configuration.
pub async fn get_filters(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(*state.filter.read().await))
}

/// Replace the active filter configuration.
///
/// The filtered view is recomputed from scratch on the next read, and
/// the playback track length is re-bounded immediately so the cursor
/// can never point past the new view.
pub async fn put_filters(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FilterConfig>,
) -> Result<impl IntoResponse, GatewayError> {
    *state.filter.write().await = body;
    let _ = state.refresh_track_len().await;
    Ok(Json(body))
}

// ---------------------------------------------------------------------------
// GET/PUT /api/layers -- map layer toggles
// ---------------------------------------------------------------------------

/// Return the current layer toggles.
pub async fn get_layers(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, GatewayError> {
    Ok(Json(*state.layers.read().await))
}

/// Replace the layer toggles.
pub async fn put_layers(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LayerToggles>,
) -> Result<impl IntoResponse, GatewayError> {
    *state.layers.write().await = body;
    Ok(Json(body))
}
