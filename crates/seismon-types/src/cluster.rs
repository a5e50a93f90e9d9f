//! Cluster types for both clustering variants.
//!
//! The grid variant is computed client-side by `seismon-core` as a cheap,
//! immediately-responsive grouping. The server variant is the authoritative
//! DBSCAN result fetched from the backend; its configuration is forwarded
//! there and never consumed by the grid algorithm.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Grid clustering (client-side)
// ---------------------------------------------------------------------------

/// A quantized grid cell identifier.
///
/// Both components are floored `degrees / cell size` indices, so events
/// within the same cell-size square share a key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct CellKey {
    /// Floored latitude index.
    pub lat: i64,
    /// Floored longitude index.
    pub lon: i64,
}

/// A transient grouping of plottable events sharing one grid cell.
///
/// Clusters carry no identity across recomputations: every relevant change
/// rebuilds the whole collection from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GridCluster {
    /// The shared cell key.
    pub key: CellKey,
    /// Latitude of the first member, used as the display centroid.
    pub latitude: f64,
    /// Longitude of the first member, used as the display centroid.
    pub longitude: f64,
    /// Number of member events. Singletons are clusters too.
    pub count: usize,
    /// Arithmetic mean of member magnitudes; non-finite members count as 0.
    pub avg_magnitude: f64,
}

// ---------------------------------------------------------------------------
// Server clustering (authoritative)
// ---------------------------------------------------------------------------

/// Configuration forwarded to the backend clustering engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClusteringConfig {
    /// Spatial reach of a cluster in kilometers.
    pub eps_km: f64,
    /// Temporal reach of a cluster in hours.
    pub time_window_hours: f64,
    /// Minimum members for a dense region; smaller groups are noise.
    pub min_samples: u32,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            eps_km: 100.0,
            time_window_hours: 24.0,
            min_samples: 3,
        }
    }
}

/// A `GeoJSON`-style point used by the backend for cluster centroids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GeoPoint {
    /// Geometry type tag, always `"Point"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]` pair.
    pub coordinates: Vec<f64>,
}

/// One authoritative cluster as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ServerCluster {
    /// Stable cluster identifier derived from the earliest member.
    pub cluster_id: String,
    /// When the backend computed this cluster, epoch milliseconds.
    pub created_at: i64,
    /// Cluster centroid.
    pub centroid: GeoPoint,
    /// Number of member events.
    pub event_count: u32,
    /// Mean member magnitude.
    pub avg_magnitude: f64,
    /// Representative region name taken from the strongest member.
    pub region: String,
    /// Earliest member time, epoch milliseconds.
    pub start_time: i64,
    /// Latest member time, epoch milliseconds.
    pub end_time: i64,
}

/// Aggregate counts shown beside the cluster toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClusterStats {
    /// Number of clusters in the latest run.
    pub total_clusters: u32,
    /// Events assigned to any cluster.
    pub total_events_in_clusters: u32,
    /// Events the backend labeled as noise.
    pub noise_events: u32,
}

/// The full authoritative snapshot served by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClusterSnapshot {
    /// Clusters from the latest backend run.
    #[serde(default)]
    pub clusters: Vec<ServerCluster>,
    /// Aggregate counts for the same run.
    #[serde(default)]
    pub stats: ClusterStats,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cell_keys_order_by_latitude_then_longitude() {
        let a = CellKey { lat: 20, lon: 40 };
        let b = CellKey { lat: 20, lon: 41 };
        let c = CellKey { lat: 21, lon: 0 };
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn server_cluster_parses_backend_payload() {
        let payload = serde_json::json!({
            "cluster_id": "cl_us7000abcd",
            "created_at": 1_700_000_000_000_i64,
            "centroid": { "type": "Point", "coordinates": [-176.1, 51.2] },
            "event_count": 7,
            "avg_magnitude": 4.3,
            "region": "Adak, Alaska",
            "start_time": 1_699_990_000_000_i64,
            "end_time": 1_700_000_000_000_i64
        });

        let cluster: ServerCluster = serde_json::from_value(payload).unwrap();
        assert_eq!(cluster.event_count, 7);
        assert_eq!(cluster.centroid.kind, "Point");
        assert_eq!(cluster.centroid.coordinates.len(), 2);
    }
}
