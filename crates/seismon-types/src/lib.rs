//! Shared type definitions for the Seismon event pipeline.
//!
//! This crate is the single source of truth for every wire-visible type in
//! the workspace. Types defined here flow downstream to `TypeScript` via
//! `ts-rs` for the map dashboard.
//!
//! # Modules
//!
//! - [`event`] -- the canonical event record and epoch normalization
//! - [`filter`] -- filter configuration and map layer toggles
//! - [`cluster`] -- grid and server cluster shapes plus clustering config
//! - [`heatmap`] -- heat cells, weighting modes, and intensity bands
//! - [`alert`] -- alert records and severity classification
//! - [`analytics`] -- precomputed chart payloads
//! - [`graph`] -- relationship graph nodes, edges, and neighbor entries

pub mod alert;
pub mod analytics;
pub mod cluster;
pub mod event;
pub mod filter;
pub mod graph;
pub mod heatmap;

// Re-export all public types at crate root for convenience.
pub use alert::{Alert, AlertSeverity};
pub use analytics::{DepthMagnitudePoint, MagnitudeBucket, RegionCount, TrendPoint};
pub use cluster::{
    CellKey, ClusterSnapshot, ClusterStats, ClusteringConfig, GeoPoint, GridCluster, ServerCluster,
};
pub use event::{EPOCH_MS_THRESHOLD, Event, normalize_epoch_ms};
pub use filter::{EXACT_MAGNITUDE_TOLERANCE, FilterConfig, LayerToggles, MagnitudeMode};
pub use graph::{
    EdgeDirection, GraphData, GraphEdge, GraphNode, NeighborEntry, NeighborRelationship,
    NodeLabel, NodeNeighbors, RelationshipKind,
};
pub use heatmap::{HeatBand, HeatPoint, HeatSample, WeightBy};
