//! Heatmap point and intensity types.
//!
//! The grid itself is backend-computed; the pipeline only min-max
//! normalizes the returned weights into a renderable `[0, 1]` scale and
//! assigns discrete color bands for renderers without a native heat
//! primitive.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// What quantity the backend aggregates into each heat cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum WeightBy {
    /// Sum of member magnitudes.
    #[default]
    Magnitude,
    /// Number of events in the cell.
    Count,
    /// Radiated energy estimate.
    Energy,
    /// Mean hypocenter depth.
    Depth,
}

impl WeightBy {
    /// The query-parameter spelling the backend expects.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Magnitude => "magnitude",
            Self::Count => "count",
            Self::Energy => "energy",
            Self::Depth => "depth",
        }
    }
}

/// One backend-computed heat cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HeatPoint {
    /// Cell center latitude.
    pub lat: f64,
    /// Cell center longitude.
    pub lon: f64,
    /// Raw aggregated weight, unit depends on [`WeightBy`].
    pub weight: f64,
    /// Number of events aggregated into the cell.
    pub count: u32,
    /// Mean magnitude of the aggregated events.
    pub avg_mag: f64,
    /// Region name, when the backend resolved one.
    #[serde(default)]
    pub region: Option<String>,
}

/// Discrete color band assigned to a normalized intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum HeatBand {
    /// Intensity above 0.8.
    Red,
    /// Intensity above 0.6.
    Orange,
    /// Intensity above 0.4.
    Yellow,
    /// Intensity above 0.2.
    Green,
    /// Everything else.
    Blue,
}

impl HeatBand {
    /// Maps a normalized intensity to its band.
    pub const fn from_intensity(intensity: f64) -> Self {
        if intensity > 0.8 {
            Self::Red
        } else if intensity > 0.6 {
            Self::Orange
        } else if intensity > 0.4 {
            Self::Yellow
        } else if intensity > 0.2 {
            Self::Green
        } else {
            Self::Blue
        }
    }
}

/// A heat cell after min-max normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HeatSample {
    /// Cell center latitude.
    pub lat: f64,
    /// Cell center longitude.
    pub lon: f64,
    /// Normalized weight in `[0, 1]`.
    pub intensity: f64,
    /// Color band derived from `intensity`.
    pub band: HeatBand,
    /// Number of events aggregated into the cell.
    pub count: u32,
    /// Mean magnitude of the aggregated events.
    pub avg_mag: f64,
    /// Region name, when the backend resolved one.
    pub region: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn weight_by_query_spelling_matches_serde() {
        let json = serde_json::to_string(&WeightBy::Energy).unwrap();
        assert_eq!(json, format!("\"{}\"", WeightBy::Energy.as_str()));
    }

    #[test]
    fn band_thresholds_are_exclusive() {
        assert_eq!(HeatBand::from_intensity(0.81), HeatBand::Red);
        assert_eq!(HeatBand::from_intensity(0.8), HeatBand::Orange);
        assert_eq!(HeatBand::from_intensity(0.6), HeatBand::Yellow);
        assert_eq!(HeatBand::from_intensity(0.4), HeatBand::Green);
        assert_eq!(HeatBand::from_intensity(0.2), HeatBand::Blue);
        assert_eq!(HeatBand::from_intensity(0.0), HeatBand::Blue);
    }

    #[test]
    fn heat_point_region_defaults_to_none() {
        let point: HeatPoint = serde_json::from_value(serde_json::json!({
            "lat": 35.0,
            "lon": -118.0,
            "weight": 12.5,
            "count": 4,
            "avg_mag": 3.1
        }))
        .unwrap();
        assert!(point.region.is_none());
    }
}
