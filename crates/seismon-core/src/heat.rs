//! Min-max normalization of heatmap weights into render-ready samples.
//!
//! The backend returns absolute weights (magnitude sums, counts, energy,
//! depth). Rendering wants intensities in `[0, 1]` plus a color band, and
//! the scale must adapt to whatever range the current response spans. A
//! degenerate range (all weights equal, or a single point) normalizes to
//! zero intensity rather than dividing by zero.

use seismon_types::{HeatBand, HeatPoint, HeatSample};

/// Normalize raw heat points against the range of the whole response.
///
/// Non-finite weights are treated as zero before the range is computed,
/// so one bad point cannot blank the entire layer.
pub fn normalize_weights(points: &[HeatPoint]) -> Vec<HeatSample> {
    let weights: Vec<f64> = points.iter().map(|p| finite_or_zero(p.weight)).collect();
    let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
    let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let divisor = if range.abs() < f64::EPSILON { 1.0 } else { range };

    points
        .iter()
        .zip(weights)
        .map(|(point, weight)| {
            let intensity = (weight - min) / divisor;
            HeatSample {
                lat: point.lat,
                lon: point.lon,
                intensity,
                band: HeatBand::from_intensity(intensity),
                count: point.count,
                avg_mag: point.avg_mag,
                region: point.region.clone(),
            }
        })
        .collect()
}

const fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
