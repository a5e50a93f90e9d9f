//! The magnitude/time predicate applied when building event snapshots.
//!
//! A filter evaluation is a pure function of three inputs: the event, the
//! filter settings, and the evaluation instant. Callers capture `now_ms`
//! once per snapshot so every event in the pass is judged against the same
//! window boundary.

use seismon_types::{normalize_epoch_ms, Event, FilterConfig, MagnitudeMode, EXACT_MAGNITUDE_TOLERANCE};

/// Milliseconds in one hour, for converting the window setting.
const MS_PER_HOUR: i64 = 3_600_000;

/// Check whether an event passes the magnitude and time-window criteria.
///
/// Magnitude is matched according to [`FilterConfig::mode`]:
///
/// - `minimum` -- magnitude at or above `mag_min`
/// - `range` -- magnitude within `[mag_min, mag_max]` inclusive
/// - `exact` -- magnitude within [`EXACT_MAGNITUDE_TOLERANCE`] of `mag_exact`
///
/// A `time_range_hours` of zero disables the time check entirely. Otherwise
/// the event timestamp (normalized to milliseconds, so second-resolution
/// feeds are not unfairly dropped) must fall at or after
/// `now_ms - time_range_hours`.
pub fn passes(event: &Event, filter: &FilterConfig, now_ms: i64) -> bool {
    let magnitude_ok = match filter.mode {
        MagnitudeMode::Minimum => event.magnitude >= filter.mag_min,
        MagnitudeMode::Range => {
            event.magnitude >= filter.mag_min && event.magnitude <= filter.mag_max
        }
        MagnitudeMode::Exact => {
            (event.magnitude - filter.mag_exact).abs() <= EXACT_MAGNITUDE_TOLERANCE
        }
    };

    if !magnitude_ok {
        return false;
    }

    if filter.time_range_hours == 0 {
        return true;
    }

    let window_ms = i64::from(filter.time_range_hours).saturating_mul(MS_PER_HOUR);
    normalize_epoch_ms(event.time) >= now_ms.saturating_sub(window_ms)
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    const NOW_MS: i64 = 1_700_000_000_000;

    fn event(magnitude: f64, time: i64) -> Event {
        Event {
            id: None,
            magnitude,
            place: String::new(),
            time,
            latitude: None,
            longitude: None,
            depth: None,
            url: None,
        }
    }

    fn filter(mode: MagnitudeMode) -> FilterConfig {
        FilterConfig {
            mode,
            ..FilterConfig::default()
        }
    }

    #[test]
    fn minimum_mode_keeps_at_or_above_threshold() {
        let f = filter(MagnitudeMode::Minimum);
        assert!(passes(&event(3.0, NOW_MS), &f, NOW_MS));
        assert!(passes(&event(7.2, NOW_MS), &f, NOW_MS));
        assert!(!passes(&event(2.9, NOW_MS), &f, NOW_MS));
    }

    #[test]
    fn range_mode_is_inclusive_on_both_ends() {
        let f = filter(MagnitudeMode::Range);
        assert!(passes(&event(3.0, NOW_MS), &f, NOW_MS));
        assert!(passes(&event(8.0, NOW_MS), &f, NOW_MS));
        assert!(!passes(&event(2.99, NOW_MS), &f, NOW_MS));
        assert!(!passes(&event(8.01, NOW_MS), &f, NOW_MS));
    }

    #[test]
    fn exact_mode_uses_tolerance_band() {
        let f = filter(MagnitudeMode::Exact);
        assert!(passes(&event(5.0, NOW_MS), &f, NOW_MS));
        assert!(passes(&event(5.1, NOW_MS), &f, NOW_MS));
        assert!(passes(&event(4.9, NOW_MS), &f, NOW_MS));
        assert!(!passes(&event(5.11, NOW_MS), &f, NOW_MS));
        assert!(!passes(&event(4.89, NOW_MS), &f, NOW_MS));
    }

    #[test]
    fn zero_hours_disables_the_window() {
        let f = FilterConfig {
            time_range_hours: 0,
            ..FilterConfig::default()
        };
        let ancient = event(6.0, 0);
        assert!(passes(&ancient, &f, NOW_MS));
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let f = FilterConfig::default();
        let boundary = NOW_MS - 24 * MS_PER_HOUR;
        assert!(passes(&event(6.0, boundary), &f, NOW_MS));
        assert!(!passes(&event(6.0, boundary - 1), &f, NOW_MS));
    }

    #[test]
    fn second_resolution_stamps_are_scaled_before_the_window_check() {
        let f = FilterConfig::default();
        // One hour ago, expressed in seconds. Without scaling this would
        // look like 1970 and be dropped.
        let an_hour_ago_s = (NOW_MS - MS_PER_HOUR) / 1000;
        assert!(passes(&event(6.0, an_hour_ago_s), &f, NOW_MS));
    }
}
