//! The canonical seismic event record.
//!
//! Every source shape accepted by the normalizer collapses into [`Event`].
//! Timestamps are epoch milliseconds after [`normalize_epoch_ms`];
//! coordinates stay optional because magnitude-only reports are still worth
//! keeping in the buffer even though they cannot be plotted.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Epoch values below this threshold are interpreted as seconds.
///
/// `10^12` milliseconds lands in 2001; `10^12` seconds lands tens of
/// thousands of years out. Every plausible second-denominated report falls
/// below the threshold and every millisecond-denominated one above it.
pub const EPOCH_MS_THRESHOLD: i64 = 1_000_000_000_000;

/// Normalizes an epoch timestamp to milliseconds.
///
/// Positive values below [`EPOCH_MS_THRESHOLD`] are treated as seconds and
/// scaled by 1000; everything else passes through unchanged. Zero and
/// negative stamps are already garbage and scaling would only move them.
pub const fn normalize_epoch_ms(raw: i64) -> i64 {
    if raw > 0 && raw < EPOCH_MS_THRESHOLD {
        raw.saturating_mul(1000)
    } else {
        raw
    }
}

/// A normalized seismic event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Stable source identifier. Absent for unkeyed or synthetic reports.
    pub id: Option<String>,
    /// Moment magnitude. Unparseable or missing source values become `0.0`.
    pub magnitude: f64,
    /// Human-readable location description. May be empty.
    pub place: String,
    /// Event time as epoch milliseconds (already normalized).
    pub time: i64,
    /// Latitude in degrees, when the source provided one.
    pub latitude: Option<f64>,
    /// Longitude in degrees, when the source provided one.
    pub longitude: Option<f64>,
    /// Hypocenter depth in kilometers, when the source provided one.
    pub depth: Option<f64>,
    /// Detail page for the event, when the source carries one.
    pub url: Option<String>,
}

impl Event {
    /// Returns `(latitude, longitude)` when the event can be placed on a
    /// map.
    ///
    /// Absent, zero, and non-finite coordinates all make an event
    /// non-plottable; the record itself is kept since non-spatial fields
    /// remain useful.
    pub const fn plot_position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon))
                if lat.is_finite()
                    && lon.is_finite()
                    && lat.abs() >= f64::EPSILON
                    && lon.abs() >= f64::EPSILON =>
            {
                Some((lat, lon))
            }
            _ => None,
        }
    }
}
