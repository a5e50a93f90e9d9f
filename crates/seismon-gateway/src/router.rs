//! Axum router construction for the gateway API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::alerts;
use crate::handlers;
use crate::playback;
use crate::proxy;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the gateway server.
///
/// The router includes the HTML status page, the `WebSocket` feed, the
/// live pipeline endpoints, playback control, the alert history, and
/// the backend-proxied analytics endpoints.
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/feed", get(ws::ws_feed))
        // Live pipeline
        .route("/api/status", get(handlers::status))
        .route("/api/events", get(handlers::list_events))
        .route("/api/events/visible", get(handlers::visible_events))
        .route("/api/clusters", get(handlers::clusters))
        .route(
            "/api/filters",
            get(handlers::get_filters).put(handlers::put_filters),
        )
        .route(
            "/api/layers",
            get(handlers::get_layers).put(handlers::put_layers),
        )
        // Playback control
        .route("/api/playback", get(playback::playback_status))
        .route("/api/playback/play", post(playback::play))
        .route("/api/playback/pause", post(playback::pause))
        .route("/api/playback/scrub", post(playback::scrub))
        .route("/api/playback/speed", post(playback::set_speed))
        // Alerts
        .route("/api/alerts", get(alerts::list_alerts))
        .route("/api/alerts/{id}/ack", post(alerts::acknowledge_alert))
        // Backend proxies
        .route("/api/heatmap", get(proxy::heatmap))
        .route("/api/analytics/{kind}", get(proxy::analytics))
        .route("/api/graph", get(proxy::graph))
        .route("/api/graph/{id}/neighbors", get(proxy::graph_neighbors))
        .route("/api/events/{id}/detail", get(proxy::event_detail))
        .route(
            "/api/clustering/config",
            get(proxy::get_clustering_config).put(proxy::put_clustering_config),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
