//! Filter configuration and map layer toggles.
//!
//! A [`FilterConfig`] is immutable per evaluation: changing any field
//! triggers a full recompute of the filtered view downstream, never an
//! incremental patch of a previous result.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Tolerance for exact-mode magnitude matching.
pub const EXACT_MAGNITUDE_TOLERANCE: f64 = 0.1;

// ---------------------------------------------------------------------------
// Magnitude selection
// ---------------------------------------------------------------------------

/// How the magnitude bounds of a [`FilterConfig`] select events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum MagnitudeMode {
    /// Pass events with magnitude at or above `mag_min`.
    #[default]
    Minimum,
    /// Pass events with magnitude inside `[mag_min, mag_max]`.
    Range,
    /// Pass events within [`EXACT_MAGNITUDE_TOLERANCE`] of `mag_exact`.
    Exact,
}

/// The active event filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FilterConfig {
    /// Magnitude selection mode.
    pub mode: MagnitudeMode,
    /// Lower magnitude bound (minimum and range modes).
    pub mag_min: f64,
    /// Upper magnitude bound (range mode).
    pub mag_max: f64,
    /// Center magnitude for exact mode.
    pub mag_exact: f64,
    /// Time window in hours; `0` bypasses the time check entirely.
    pub time_range_hours: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            mode: MagnitudeMode::Minimum,
            mag_min: 3.0,
            mag_max: 8.0,
            mag_exact: 5.0,
            time_range_hours: 24,
        }
    }
}

// ---------------------------------------------------------------------------
// Layer toggles
// ---------------------------------------------------------------------------

/// Which map layers the host UI currently renders.
///
/// The pipeline itself only reads these to decide what to recompute; the
/// toggles travel through the gateway so every subscriber sees the same
/// view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LayerToggles {
    /// Individual event markers.
    pub markers: bool,
    /// Heatmap intensity layer.
    pub heatmap: bool,
    /// Grid cluster layer.
    pub clusters: bool,
    /// Relationship graph overlay.
    pub graph: bool,
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self {
            markers: true,
            heatmap: false,
            clusters: false,
            graph: false,
        }
    }
}
