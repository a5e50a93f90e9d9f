//! Relationship graph shapes served by the backend graph store.
//!
//! Nodes mix event records with derived entities (clusters, regions, fault
//! zones); edges carry a seismological relationship kind. The pipeline
//! fetches and forwards these without interpreting them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// What kind of entity a graph node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum NodeLabel {
    /// A single seismic event.
    Earthquake,
    /// A backend-computed cluster.
    Cluster,
    /// A populated place near an epicenter.
    City,
    /// A named geographic region.
    Region,
    /// A known fault zone.
    FaultZone,
    /// A state or province.
    State,
}

/// Seismological relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum RelationshipKind {
    /// Event is the epicenter record of a cluster.
    EpicenterOf,
    /// Event followed a larger event in the same sequence.
    AftershockOf,
    /// Event preceded a larger event in the same sequence.
    ForeshockOf,
    /// Event plausibly triggered another.
    Triggered,
    /// Spatial proximity without a causal claim.
    Near,
}

impl RelationshipKind {
    /// The wire spelling used in query parameters and edge payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EpicenterOf => "EPICENTER_OF",
            Self::AftershockOf => "AFTERSHOCK_OF",
            Self::ForeshockOf => "FORESHOCK_OF",
            Self::Triggered => "TRIGGERED",
            Self::Near => "NEAR",
        }
    }
}

/// Direction of a relationship relative to the queried node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum EdgeDirection {
    /// The related node points at the queried node.
    In,
    /// The queried node points at the related node.
    Out,
}

/// One node of the relationship graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GraphNode {
    /// Node identifier (event id for earthquake nodes).
    pub id: String,
    /// Entity kind.
    pub label: NodeLabel,
    /// Latitude, for plottable nodes.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude, for plottable nodes.
    #[serde(default)]
    pub lon: Option<f64>,
    /// Magnitude, for earthquake nodes.
    #[serde(default)]
    pub mag: Option<f64>,
    /// Depth in kilometers, for earthquake nodes.
    #[serde(default)]
    pub depth: Option<f64>,
    /// Location description, for earthquake nodes.
    #[serde(default)]
    pub place: Option<String>,
    /// Event time in epoch milliseconds, for earthquake nodes.
    #[serde(default)]
    pub time: Option<i64>,
    /// Member count, for cluster nodes.
    #[serde(default)]
    pub event_count: Option<u32>,
    /// Mean member magnitude, for cluster nodes.
    #[serde(default)]
    pub avg_mag: Option<f64>,
    /// Edge count of the node within the returned subgraph.
    #[serde(default)]
    pub degree: Option<u32>,
}

/// One edge of the relationship graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GraphEdge {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Relationship kind.
    #[serde(rename = "type")]
    pub relationship: RelationshipKind,
}

/// A subgraph returned by the graph query endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GraphData {
    /// Nodes of the subgraph.
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    /// Edges of the subgraph.
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

/// The relationship half of a neighbor entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NeighborRelationship {
    /// Relationship kind.
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    /// Direction relative to the queried node.
    pub direction: EdgeDirection,
}

/// One neighbor of a queried node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NeighborEntry {
    /// The related node.
    pub node: GraphNode,
    /// How it relates to the queried node.
    pub relationship: NeighborRelationship,
}

/// Response of the node-neighbors endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NodeNeighbors {
    /// Every neighbor of the queried node.
    #[serde(default)]
    pub neighbors: Vec<NeighborEntry>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn relationship_kinds_use_screaming_snake_case() {
        let json = serde_json::to_string(&RelationshipKind::AftershockOf).unwrap();
        assert_eq!(json, "\"AFTERSHOCK_OF\"");

        let back: RelationshipKind = serde_json::from_str("\"EPICENTER_OF\"").unwrap();
        assert_eq!(back, RelationshipKind::EpicenterOf);
    }

    #[test]
    fn relationship_query_spelling_matches_serde() {
        let kinds = [
            RelationshipKind::EpicenterOf,
            RelationshipKind::AftershockOf,
            RelationshipKind::ForeshockOf,
            RelationshipKind::Triggered,
            RelationshipKind::Near,
        ];
        for kind in kinds {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn graph_edge_wire_field_is_type() {
        let edge: GraphEdge = serde_json::from_value(serde_json::json!({
            "source": "us7000abcd",
            "target": "us7000efgh",
            "type": "NEAR"
        }))
        .unwrap();
        assert_eq!(edge.relationship, RelationshipKind::Near);
    }

    #[test]
    fn sparse_nodes_parse_with_missing_fields() {
        let node: GraphNode = serde_json::from_value(serde_json::json!({
            "id": "region-ca",
            "label": "Region"
        }))
        .unwrap();
        assert_eq!(node.label, NodeLabel::Region);
        assert!(node.mag.is_none());
        assert!(node.degree.is_none());
    }
}
