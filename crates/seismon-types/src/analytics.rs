//! Precomputed analytics shapes served by the backend.
//!
//! These are consumed as-is: the backend owns the bucketing and the
//! pipeline never recomputes them. Field names follow the chart payloads.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One bar of the magnitude histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MagnitudeBucket {
    /// Bucket label, e.g. `"3.0-3.9"`.
    pub bucket: String,
    /// Events in the bucket.
    pub count: u64,
}

/// One point of the event-rate trend line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TrendPoint {
    /// Time-bucket label, e.g. an hour or day stamp.
    pub label: String,
    /// Events in the bucket.
    pub count: u64,
}

/// One sample of the depth-versus-magnitude scatter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DepthMagnitudePoint {
    /// Event magnitude.
    pub magnitude: f64,
    /// Hypocenter depth in kilometers.
    pub depth: f64,
}

/// Event count for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RegionCount {
    /// Region name as reported by the backend.
    pub region: String,
    /// Events attributed to the region.
    pub count: u64,
}
