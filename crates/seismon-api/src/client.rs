//! HTTP client for the analytics backend.
//!
//! One thin `reqwest` wrapper per backend endpoint the monitor consumes:
//! historical events, precomputed analytics, authoritative clusters,
//! heatmap cells, and the relationship graph. Responses are probed as
//! loose `serde_json::Value` first because deployments disagree on
//! envelopes -- some return bare arrays, others wrap them in a keyed
//! object -- and the extract helpers accept both.

use std::time::Duration;

use seismon_core::config::ApiConfig;
use seismon_types::{
    ClusterSnapshot, ClusteringConfig, DepthMagnitudePoint, Event, GraphData, HeatPoint,
    MagnitudeBucket, NodeNeighbors, RegionCount, RelationshipKind, TrendPoint, WeightBy,
};

use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Query parameter types
// ---------------------------------------------------------------------------

/// Query parameters for the latest-events endpoint.
///
/// `None` fields are omitted from the query string entirely; the backend
/// applies no bound for an absent parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventQuery {
    /// Minimum magnitude, inclusive.
    pub mag_min: Option<f64>,
    /// Maximum magnitude, inclusive.
    pub mag_max: Option<f64>,
    /// Minimum depth in kilometers, inclusive.
    pub depth_min: Option<f64>,
    /// Maximum depth in kilometers, inclusive.
    pub depth_max: Option<f64>,
    /// Maximum number of events to return.
    pub limit: Option<u32>,
}

/// Query parameters for the graph subgraph endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphQuery {
    /// Only include events at or after this epoch-millisecond stamp.
    pub start_time: Option<i64>,
    /// Minimum magnitude, inclusive.
    pub min_mag: Option<f64>,
    /// Maximum magnitude, inclusive.
    pub max_mag: Option<f64>,
    /// Relationship kinds to include; empty requests every kind.
    pub relationship_types: Vec<RelationshipKind>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the Seismon analytics backend.
///
/// One instance lives for the life of the gateway; `reqwest::Client`
/// pools connections internally so cloning per request is unnecessary.
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client from API configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The configured backend base URL, without a trailing slash.
    pub const fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Fetch the most recent events, optionally bounded by the query.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success status, or
    /// a response that is neither an event list nor an `events` envelope.
    pub async fn latest_events(&self, query: &EventQuery) -> Result<Vec<Event>, ApiError> {
        let json = self
            .get_json("/earthquakes/latest", &event_params(query))
            .await?;
        extract_list(json, "events")
    }

    /// Fetch the detail record for one event.
    ///
    /// The detail shape belongs to the backend and is richer than
    /// [`Event`]; it is passed through untyped for the UI to render.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-success status.
    pub async fn event_detail(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        self.get_json(&format!("/earthquakes/{id}"), &[]).await
    }

    // -----------------------------------------------------------------------
    // Analytics
    // -----------------------------------------------------------------------

    /// Fetch the magnitude histogram.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or shape failure.
    pub async fn magnitude_distribution(&self) -> Result<Vec<MagnitudeBucket>, ApiError> {
        let json = self
            .get_json("/analytics/magnitude-distribution", &[])
            .await?;
        extract_list(json, "buckets")
    }

    /// Fetch the time-bucketed event-rate trend.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or shape failure.
    pub async fn trends(&self) -> Result<Vec<TrendPoint>, ApiError> {
        let json = self.get_json("/analytics/trends", &[]).await?;
        extract_list(json, "points")
    }

    /// Fetch the depth-versus-magnitude scatter.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or shape failure.
    pub async fn depth_magnitude(&self) -> Result<Vec<DepthMagnitudePoint>, ApiError> {
        let json = self.get_json("/analytics/depth-magnitude", &[]).await?;
        extract_list(json, "points")
    }

    /// Fetch per-region event counts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or shape failure.
    pub async fn top_regions(&self) -> Result<Vec<RegionCount>, ApiError> {
        let json = self.get_json("/analytics/top-regions", &[]).await?;
        extract_list(json, "regions")
    }

    // -----------------------------------------------------------------------
    // Clusters
    // -----------------------------------------------------------------------

    /// Fetch the authoritative cluster snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or shape failure.
    pub async fn clusters(&self) -> Result<ClusterSnapshot, ApiError> {
        let json = self.get_json("/clusters", &[]).await?;
        extract_cluster_snapshot(json)
    }

    /// Fetch the current backend clustering configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or decode failure.
    pub async fn clustering_config(&self) -> Result<ClusteringConfig, ApiError> {
        let json = self.get_json("/clusters/config", &[]).await?;
        Ok(serde_json::from_value(json)?)
    }

    /// Replace the backend clustering configuration.
    ///
    /// The backend recomputes asynchronously with no completion signal;
    /// pair this with a bounded poll of [`Self::clusters`] to pick up
    /// the new result.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-success status.
    pub async fn put_clustering_config(&self, config: ClusteringConfig) -> Result<(), ApiError> {
        let url = format!("{}/clusters/config", self.base_url);
        let response = self.client.put(&url).json(&config).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            return Err(ApiError::Status { status, body });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Heatmap
    // -----------------------------------------------------------------------

    /// Fetch backend heat cells for a weighting mode and time range.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or shape failure.
    pub async fn heatmap(
        &self,
        weight_by: WeightBy,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<Vec<HeatPoint>, ApiError> {
        let mut params = vec![("weight_by", weight_by.as_str().to_owned())];
        if let Some(v) = start_time {
            params.push(("start_time", v.to_string()));
        }
        if let Some(v) = end_time {
            params.push(("end_time", v.to_string()));
        }
        let json = self.get_json("/earthquakes/heatmap", &params).await?;
        extract_list(json, "points")
    }

    // -----------------------------------------------------------------------
    // Relationship graph
    // -----------------------------------------------------------------------

    /// Fetch a relationship subgraph.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or decode failure.
    pub async fn graph_events(&self, query: &GraphQuery) -> Result<GraphData, ApiError> {
        let json = self.get_json("/graph/events", &graph_params(query)).await?;
        Ok(serde_json::from_value(json)?)
    }

    /// Fetch the immediate neighbors of one graph node.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or decode failure.
    pub async fn node_neighbors(&self, id: &str) -> Result<NodeNeighbors, ApiError> {
        let json = self
            .get_json(&format!("/graph/nodes/{id}/neighbors"), &[])
            .await?;
        Ok(serde_json::from_value(json)?)
    }

    // -----------------------------------------------------------------------
    // Shared request plumbing
    // -----------------------------------------------------------------------

    /// Issue a GET and return the body as loose JSON.
    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            return Err(ApiError::Status { status, body });
        }
        Ok(response.json().await?)
    }
}

/// Read a non-success body for the error message, tolerating read failures.
async fn read_error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_owned())
}

// ---------------------------------------------------------------------------
// Query building and response probing
// ---------------------------------------------------------------------------

/// Non-empty query pairs for the latest-events endpoint.
fn event_params(query: &EventQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(v) = query.mag_min {
        params.push(("mag_min", v.to_string()));
    }
    if let Some(v) = query.mag_max {
        params.push(("mag_max", v.to_string()));
    }
    if let Some(v) = query.depth_min {
        params.push(("depth_min", v.to_string()));
    }
    if let Some(v) = query.depth_max {
        params.push(("depth_max", v.to_string()));
    }
    if let Some(v) = query.limit {
        params.push(("limit", v.to_string()));
    }
    params
}

/// Non-empty query pairs for the graph subgraph endpoint.
fn graph_params(query: &GraphQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(v) = query.start_time {
        params.push(("start_time", v.to_string()));
    }
    if let Some(v) = query.min_mag {
        params.push(("min_mag", v.to_string()));
    }
    if let Some(v) = query.max_mag {
        params.push(("max_mag", v.to_string()));
    }
    if !query.relationship_types.is_empty() {
        let kinds: Vec<&str> = query
            .relationship_types
            .iter()
            .copied()
            .map(RelationshipKind::as_str)
            .collect();
        params.push(("relationship_types", kinds.join(",")));
    }
    params
}

/// Pull a typed list out of a response that is either a bare array or an
/// object wrapping the array under `key`.
fn extract_list<T: serde::de::DeserializeOwned>(
    mut json: serde_json::Value,
    key: &str,
) -> Result<Vec<T>, ApiError> {
    if json.is_array() {
        return Ok(serde_json::from_value(json)?);
    }
    let Some(items) = json.get_mut(key).map(serde_json::Value::take) else {
        return Err(ApiError::Shape(format!(
            "expected a list or an object with a `{key}` field"
        )));
    };
    Ok(serde_json::from_value(items)?)
}

/// Decode the cluster snapshot, tolerating a bare cluster list from
/// backends that have not computed stats yet.
fn extract_cluster_snapshot(json: serde_json::Value) -> Result<ClusterSnapshot, ApiError> {
    if json.is_array() {
        let clusters = serde_json::from_value(json)?;
        return Ok(ClusterSnapshot {
            clusters,
            ..ClusterSnapshot::default()
        });
    }
    Ok(serde_json::from_value(json)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn extract_list_accepts_a_bare_array() {
        let json = serde_json::json!([{
            "id": "us7000abcd",
            "magnitude": 4.5,
            "place": "63 km SE of Adak, Alaska",
            "time": 1_700_000_000_000_i64,
            "latitude": 51.2,
            "longitude": -176.1,
            "depth": 12.0
        }]);
        let events: Vec<Event> = extract_list(json, "events").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events.first().unwrap().id.as_deref(), Some("us7000abcd"));
    }

    #[test]
    fn extract_list_accepts_a_keyed_envelope() {
        let json = serde_json::json!({
            "events": [{
                "id": "us7000efgh",
                "magnitude": 3.1,
                "place": "central California",
                "time": 1_700_000_100_000_i64,
                "latitude": 36.5,
                "longitude": -121.2,
                "depth": 5.0
            }],
            "count": 1
        });
        let events: Vec<Event> = extract_list(json, "events").unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn extract_list_rejects_an_unrelated_object() {
        let json = serde_json::json!({"detail": "not found"});
        let result: Result<Vec<Event>, ApiError> = extract_list(json, "events");
        assert!(matches!(result, Err(ApiError::Shape(_))));
    }

    #[test]
    fn extract_list_surfaces_element_decode_failures() {
        let json = serde_json::json!({"buckets": [{"bucket": 42}]});
        let result: Result<Vec<MagnitudeBucket>, ApiError> = extract_list(json, "buckets");
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn analytics_envelopes_unwrap_to_typed_lists() {
        let buckets: Vec<MagnitudeBucket> = extract_list(
            serde_json::json!({"buckets": [{"bucket": "4.0-4.9", "count": 12}]}),
            "buckets",
        )
        .unwrap();
        assert_eq!(buckets.first().unwrap().count, 12);

        let regions: Vec<RegionCount> = extract_list(
            serde_json::json!({"regions": [{"region": "Alaska", "count": 40}]}),
            "regions",
        )
        .unwrap();
        assert_eq!(regions.first().unwrap().region, "Alaska");
    }

    #[test]
    fn extract_cluster_snapshot_accepts_the_full_envelope() {
        let json = serde_json::json!({
            "clusters": [{
                "cluster_id": "cl_us7000abcd",
                "created_at": 1_700_000_000_000_i64,
                "centroid": {"type": "Point", "coordinates": [-176.1, 51.2]},
                "event_count": 7,
                "avg_magnitude": 4.3,
                "region": "Adak, Alaska",
                "start_time": 1_699_990_000_000_i64,
                "end_time": 1_700_000_000_000_i64
            }],
            "stats": {
                "total_clusters": 1,
                "total_events_in_clusters": 7,
                "noise_events": 3
            }
        });
        let snapshot = extract_cluster_snapshot(json).unwrap();
        assert_eq!(snapshot.clusters.len(), 1);
        assert_eq!(snapshot.stats.noise_events, 3);
    }

    #[test]
    fn extract_cluster_snapshot_accepts_a_bare_list() {
        let snapshot = extract_cluster_snapshot(serde_json::json!([])).unwrap();
        assert!(snapshot.clusters.is_empty());
        assert_eq!(snapshot.stats.total_clusters, 0);
    }

    #[test]
    fn event_params_skip_absent_fields() {
        assert!(event_params(&EventQuery::default()).is_empty());

        let params = event_params(&EventQuery {
            mag_min: Some(2.5),
            limit: Some(20),
            ..EventQuery::default()
        });
        assert_eq!(
            params,
            vec![("mag_min", "2.5".to_owned()), ("limit", "20".to_owned())]
        );
    }

    #[test]
    fn graph_params_join_relationship_kinds() {
        let params = graph_params(&GraphQuery {
            start_time: Some(1_700_000_000_000),
            min_mag: Some(4.9),
            max_mag: Some(5.1),
            relationship_types: vec![RelationshipKind::EpicenterOf, RelationshipKind::Near],
        });
        assert!(params.contains(&("relationship_types", "EPICENTER_OF,NEAR".to_owned())));
        assert!(params.contains(&("min_mag", "4.9".to_owned())));
    }

    #[test]
    fn graph_params_omit_an_empty_kind_list() {
        let params = graph_params(&GraphQuery::default());
        assert!(params.is_empty());
    }

    #[test]
    fn client_trims_trailing_slashes_from_the_base_url() {
        let client = BackendClient::new(&ApiConfig {
            base_url: "http://backend:8000/".to_owned(),
            request_timeout_ms: 1_000,
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://backend:8000");
    }
}
