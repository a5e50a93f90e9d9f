//! Handlers backed by the analytics backend.
//!
//! Everything here requires a configured [`BackendClient`]; deployments
//! without one get `503` and the live pipeline keeps running. Upstream
//! failures map to `502` with the backend's message passed through. The
//! clustering config endpoints additionally cache the last known value
//! so the dashboard stays populated across backend restarts.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/heatmap` | Normalized heat samples |
//! | `GET` | `/api/analytics/{kind}` | Precomputed chart payloads |
//! | `GET` | `/api/graph` | Relationship subgraph |
//! | `GET` | `/api/graph/{id}/neighbors` | Neighbors of one node |
//! | `GET` | `/api/events/{id}/detail` | Enriched single-event record |
//! | `GET`/`PUT` | `/api/clustering/config` | Backend clustering config |

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use seismon_api::client::{BackendClient, GraphQuery};
use seismon_api::poll::run_budget;
use seismon_core::retry::PollBudget;
use seismon_types::{ClusteringConfig, RelationshipKind, WeightBy};
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/heatmap` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct HeatmapQuery {
    /// Aggregation quantity (default: magnitude).
    pub weight_by: Option<WeightBy>,
    /// Inclusive window start, epoch milliseconds.
    pub start_time: Option<i64>,
    /// Inclusive window end, epoch milliseconds.
    pub end_time: Option<i64>,
}

/// Query parameters for the `GET /api/graph` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct GraphParams {
    /// Only include events at or after this epoch-millisecond stamp.
    pub start_time: Option<i64>,
    /// Minimum magnitude, inclusive.
    pub min_mag: Option<f64>,
    /// Maximum magnitude, inclusive.
    pub max_mag: Option<f64>,
    /// Comma-separated relationship kinds (e.g. `EPICENTER_OF,NEAR`).
    pub relationship_types: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /api/heatmap
// ---------------------------------------------------------------------------

/// Fetch backend heat cells and normalize their weights for rendering.
pub async fn heatmap(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HeatmapQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let backend = require_backend(&state)?;
    let weight_by = params.weight_by.unwrap_or_default();
    let points = backend
        .heatmap(weight_by, params.start_time, params.end_time)
        .await?;
    let samples = seismon_core::heat::normalize_weights(&points);

    Ok(Json(serde_json::json!({
        "weight_by": weight_by,
        "count": samples.len(),
        "samples": samples,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/analytics/{kind}
// ---------------------------------------------------------------------------

/// Fetch one precomputed chart payload from the backend.
///
/// Recognized kinds are `magnitude-distribution`, `trends`,
/// `depth-magnitude`, and `top-regions`; anything else is `404`.
pub async fn analytics(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let backend = require_backend(&state)?;

    let body = match kind.as_str() {
        "magnitude-distribution" => {
            let buckets = backend.magnitude_distribution().await?;
            serde_json::json!({ "count": buckets.len(), "buckets": buckets })
        }
        "trends" => {
            let points = backend.trends().await?;
            serde_json::json!({ "count": points.len(), "points": points })
        }
        "depth-magnitude" => {
            let points = backend.depth_magnitude().await?;
            serde_json::json!({ "count": points.len(), "points": points })
        }
        "top-regions" => {
            let regions = backend.top_regions().await?;
            serde_json::json!({ "count": regions.len(), "regions": regions })
        }
        _ => return Err(GatewayError::NotFound(format!("analytics kind {kind}"))),
    };

    Ok(Json(body))
}

// ---------------------------------------------------------------------------
// GET /api/graph
// ---------------------------------------------------------------------------

/// Fetch a relationship subgraph from the backend.
pub async fn graph(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let backend = require_backend(&state)?;
    let relationship_types = parse_relationship_types(params.relationship_types.as_deref())?;
    let query = GraphQuery {
        start_time: params.start_time,
        min_mag: params.min_mag,
        max_mag: params.max_mag,
        relationship_types,
    };
    let data = backend.graph_events(&query).await?;
    Ok(Json(data))
}

// ---------------------------------------------------------------------------
// GET /api/graph/{id}/neighbors
// ---------------------------------------------------------------------------

/// Fetch the immediate neighbors of one graph node.
pub async fn graph_neighbors(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let backend = require_backend(&state)?;
    let neighbors = backend.node_neighbors(&id).await?;
    Ok(Json(neighbors))
}

// ---------------------------------------------------------------------------
// GET /api/events/{id}/detail
// ---------------------------------------------------------------------------

/// Fetch the enriched single-event record from the backend.
///
/// The detail payload is richer than the wire event (region joins,
/// derived energy) and is passed through untyped.
pub async fn event_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let backend = require_backend(&state)?;
    let detail = backend.event_detail(&id).await?;
    Ok(Json(detail))
}

// ---------------------------------------------------------------------------
// GET/PUT /api/clustering/config
// ---------------------------------------------------------------------------

/// Return the backend clustering configuration.
///
/// The live value is fetched when a backend is configured and reachable;
/// otherwise the last known value is served so the panel never blanks.
pub async fn get_clustering_config(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, GatewayError> {
    if let Some(backend) = &state.backend {
        match backend.clustering_config().await {
            Ok(config) => {
                *state.clustering_config.write().await = config;
                return Ok(Json(config));
            }
            Err(e) => {
                warn!(error = %e, "clustering config fetch failed, serving last known");
            }
        }
    }
    Ok(Json(*state.clustering_config.read().await))
}

/// Forward a new clustering configuration to the backend.
///
/// The backend recomputes asynchronously with no completion signal, so
/// a bounded poll task is spawned to pick up the refreshed cluster
/// snapshot; the response does not wait for it.
pub async fn put_clustering_config(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ClusteringConfig>,
) -> Result<impl IntoResponse, GatewayError> {
    let backend = Arc::clone(require_backend(&state)?);
    backend.put_clustering_config(body).await?;
    *state.clustering_config.write().await = body;

    let budget = PollBudget::new(
        state.config.clustering.poll_attempts,
        state.config.clustering.poll_interval_ms,
        state.config.clustering.poll_initial_delay_ms,
    );
    let snapshots = Arc::clone(&state.server_clusters);
    tokio::spawn(async move {
        let hits = run_budget(budget, || {
            let backend = Arc::clone(&backend);
            let snapshots = Arc::clone(&snapshots);
            async move {
                match backend.clusters().await {
                    Ok(snapshot) => {
                        *snapshots.write().await = Some(snapshot);
                        true
                    }
                    Err(e) => {
                        warn!(error = %e, "cluster snapshot poll failed");
                        false
                    }
                }
            }
        })
        .await;
        debug!(hits, "cluster snapshot polling finished");
    });

    Ok(Json(body))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Return the backend client, or [`GatewayError::NoBackend`] when this
/// deployment runs without one.
fn require_backend(state: &AppState) -> Result<&Arc<BackendClient>, GatewayError> {
    state.backend.as_ref().ok_or(GatewayError::NoBackend)
}

/// Parse a comma-separated relationship-kind list using the canonical
/// wire spelling.
fn parse_relationship_types(raw: Option<&str>) -> Result<Vec<RelationshipKind>, GatewayError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            serde_json::from_value::<RelationshipKind>(serde_json::Value::String(s.to_owned()))
                .map_err(|e| GatewayError::InvalidQuery(format!("relationship type {s}: {e}")))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn relationship_types_parse_from_wire_spelling() {
        let kinds = parse_relationship_types(Some("EPICENTER_OF,NEAR")).unwrap();
        assert_eq!(
            kinds,
            vec![RelationshipKind::EpicenterOf, RelationshipKind::Near]
        );
    }

    #[test]
    fn relationship_types_tolerate_spacing_and_trailing_commas() {
        let kinds = parse_relationship_types(Some(" AFTERSHOCK_OF , TRIGGERED ,")).unwrap();
        assert_eq!(
            kinds,
            vec![RelationshipKind::AftershockOf, RelationshipKind::Triggered]
        );
    }

    #[test]
    fn absent_relationship_types_request_every_kind() {
        assert!(parse_relationship_types(None).unwrap().is_empty());
    }

    #[test]
    fn unknown_relationship_type_is_rejected() {
        let result = parse_relationship_types(Some("SIDEWAYS_OF"));
        assert!(matches!(result, Err(GatewayError::InvalidQuery(_))));
    }
}
