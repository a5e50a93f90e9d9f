//! Grid-based spatial clustering of plottable events.
//!
//! Events are bucketed into fixed-size latitude/longitude cells (floor
//! division by the cell size). Every non-empty cell is a cluster, singletons
//! included. The cluster anchors at its first member's exact position
//! rather than the cell center, so a lone event never drifts on screen when
//! clustering is toggled.
//!
//! Clustering is recomputed from scratch on every call. The input slice is
//! expected to be the current visible snapshot, so cluster membership always
//! reflects the active filter.

use std::collections::BTreeMap;

use seismon_types::{CellKey, Event, GridCluster};

/// Compute the grid cell for a plottable position.
pub fn cell_key(latitude: f64, longitude: f64, cell_size_deg: f64) -> CellKey {
    CellKey {
        lat: floor_cell(latitude, cell_size_deg),
        lon: floor_cell(longitude, cell_size_deg),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn floor_cell(value: f64, cell_size_deg: f64) -> i64 {
    (value / cell_size_deg).floor() as i64
}

/// Group events into grid clusters.
///
/// Non-plottable events (missing, zero, or non-finite coordinates) are
/// skipped. Cluster centroids are the first member's coordinates; magnitude
/// is averaged with non-finite values counted as zero. Output is ordered by
/// cell key, so equal inputs produce identical output.
pub fn cluster(events: &[Event], cell_size_deg: f64) -> Vec<GridCluster> {
    let mut cells: BTreeMap<CellKey, Vec<&Event>> = BTreeMap::new();
    for event in events {
        if let Some((lat, lon)) = event.plot_position() {
            cells
                .entry(cell_key(lat, lon, cell_size_deg))
                .or_default()
                .push(event);
        }
    }

    cells
        .into_iter()
        .filter_map(|(key, members)| {
            let (latitude, longitude) = members.first()?.plot_position()?;
            let sum: f64 = members.iter().map(|e| finite_or_zero(e.magnitude)).sum();
            #[allow(clippy::cast_precision_loss)]
            let count_f = members.len() as f64;
            Some(GridCluster {
                key,
                latitude,
                longitude,
                count: members.len(),
                avg_magnitude: sum / count_f,
            })
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
