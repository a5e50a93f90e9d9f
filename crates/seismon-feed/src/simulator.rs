//! Synthetic feed for development without a live upstream.
//!
//! Emits one fabricated event per interval, cycling through the three wire
//! shapes the normalizer understands: flat records, `GeoJSON` features, and
//! worker-style records with stringified numerics. Strong events also emit
//! an alert frame, mirroring the producer's threshold behavior. Every fifth
//! event carries a second-resolution timestamp, so the timestamp scaling
//! path stays exercised end to end.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::info;

use crate::channel::{wait_or_closed, StreamHandle};

/// Magnitude at or above which an alert frame accompanies the event.
pub const ALERT_THRESHOLD_MAG: f64 = 5.0;

const PLACES: &[&str] = &[
    "10 km NE of Ridgecrest, CA",
    "22 km W of Petrolia, CA",
    "near the coast of central Chile",
    "Kermadec Islands region",
    "south of the Fiji Islands",
    "Izu Islands, Japan region",
    "central Alaska",
    "Mid-Atlantic Ridge",
];

/// The wire shapes the simulator rotates through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameShape {
    Flat,
    GeoJson,
    Stringified,
}

impl FrameShape {
    const fn for_sequence(sequence: u64) -> Self {
        match sequence % 3 {
            0 => Self::Flat,
            1 => Self::GeoJson,
            _ => Self::Stringified,
        }
    }
}

/// One fabricated event, before encoding into a wire shape.
#[derive(Debug, Clone)]
struct SyntheticEvent {
    id: String,
    magnitude: f64,
    place: &'static str,
    time: i64,
    latitude: f64,
    longitude: f64,
    depth: f64,
    url: String,
}

impl SyntheticEvent {
    /// Fabricate the next event in the sequence.
    fn next(sequence: u64, now_ms: i64) -> Self {
        let mut rng = rand::rng();
        let magnitude = f64::from(rng.random_range(5_u32..=75)) / 10.0;
        let place = PLACES
            .get(rng.random_range(0..PLACES.len()))
            .copied()
            .unwrap_or("unknown region");
        // Every fifth event reports in seconds, like some upstream feeds do.
        let time = if sequence % 5 == 4 { now_ms / 1000 } else { now_ms };
        let id = format!("sim{sequence}");
        Self {
            url: format!("https://earthquake.usgs.gov/earthquakes/eventpage/{id}"),
            id,
            magnitude,
            place,
            time,
            latitude: rng.random_range(-60.0..60.0),
            longitude: rng.random_range(-180.0..180.0),
            depth: rng.random_range(2.0..600.0_f64).round(),
        }
    }

    /// Encode the event in the given wire shape.
    fn frame(&self, shape: FrameShape) -> String {
        let value = match shape {
            FrameShape::Flat => json!({
                "id": self.id,
                "magnitude": self.magnitude,
                "place": self.place,
                "time": self.time,
                "latitude": self.latitude,
                "longitude": self.longitude,
                "depth": self.depth,
                "url": self.url,
            }),
            FrameShape::GeoJson => json!({
                "type": "Feature",
                "id": self.id,
                "properties": {
                    "mag": self.magnitude,
                    "place": self.place,
                    "time": self.time,
                    "url": self.url,
                },
                "geometry": {
                    "type": "Point",
                    "coordinates": [self.longitude, self.latitude, self.depth],
                },
            }),
            FrameShape::Stringified => json!({
                "id": self.id,
                "magnitude": format!("{:.1}", self.magnitude),
                "place": self.place,
                "time": self.time.to_string(),
                "latitude": self.latitude.to_string(),
                "longitude": self.longitude.to_string(),
                "depth": self.depth.to_string(),
                "url": self.url,
            }),
        };
        value.to_string()
    }

    /// Encode the alert frame that accompanies a strong event.
    fn alert_frame(&self) -> String {
        json!({
            "event": {
                "id": self.id,
                "magnitude": format!("{:.1}", self.magnitude),
                "place": self.place,
                "time": self.time.to_string(),
                "latitude": self.latitude.to_string(),
                "longitude": self.longitude.to_string(),
                "depth": self.depth.to_string(),
            },
            "message": format!(
                "ALERT: Magnitude {:.1} earthquake detected near {}",
                self.magnitude, self.place
            ),
        })
        .to_string()
    }
}

/// Run the simulator until the handle closes.
///
/// Emits into the same frame channel as the live connection, so the rest
/// of the pipeline cannot tell the two modes apart.
pub async fn run_simulator(
    interval_ms: u64,
    frames: mpsc::Sender<String>,
    handle: Arc<StreamHandle>,
) {
    let mut sequence: u64 = 0;
    info!(interval_ms, "feed simulator started");

    while !handle.is_closed() {
        if wait_or_closed(&handle, interval_ms).await {
            break;
        }

        let event = SyntheticEvent::next(sequence, Utc::now().timestamp_millis());
        let shape = FrameShape::for_sequence(sequence);
        if frames.send(event.frame(shape)).await.is_err() {
            break;
        }
        if event.magnitude >= ALERT_THRESHOLD_MAG
            && frames.send(event.alert_frame()).await.is_err()
        {
            break;
        }
        sequence = sequence.saturating_add(1);
    }

    info!(sequence, "feed simulator stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use seismon_core::normalize::{normalize_str, Normalized};

    use super::*;

    const NOW_MS: i64 = 1_700_000_000_000;

    fn sample() -> SyntheticEvent {
        SyntheticEvent {
            id: "sim7".to_owned(),
            magnitude: 6.2,
            place: "central Alaska",
            time: NOW_MS,
            latitude: 61.5,
            longitude: -149.9,
            depth: 40.0,
            url: "https://earthquake.usgs.gov/earthquakes/eventpage/sim7".to_owned(),
        }
    }

    fn expect_event(raw: &str) -> seismon_types::Event {
        match normalize_str(raw, NOW_MS).unwrap() {
            Normalized::Event(event) => event,
            other => panic!("expected an event, got {other:?}"),
        }
    }

    #[test]
    fn flat_frames_survive_normalization() {
        let event = expect_event(&sample().frame(FrameShape::Flat));
        assert_eq!(event.id.as_deref(), Some("sim7"));
        assert!((event.magnitude - 6.2).abs() < f64::EPSILON);
        assert_eq!(event.time, NOW_MS);
        assert_eq!(event.plot_position(), Some((61.5, -149.9)));
    }

    #[test]
    fn geojson_frames_survive_normalization() {
        let event = expect_event(&sample().frame(FrameShape::GeoJson));
        assert_eq!(event.id.as_deref(), Some("sim7"));
        assert!((event.magnitude - 6.2).abs() < f64::EPSILON);
        assert_eq!(event.plot_position(), Some((61.5, -149.9)));
        assert_eq!(event.depth, Some(40.0));
        assert_eq!(event.place, "central Alaska");
    }

    #[test]
    fn stringified_frames_survive_normalization() {
        let event = expect_event(&sample().frame(FrameShape::Stringified));
        assert!((event.magnitude - 6.2).abs() < f64::EPSILON);
        assert_eq!(event.time, NOW_MS);
        assert_eq!(event.plot_position(), Some((61.5, -149.9)));
    }

    #[test]
    fn alert_frames_normalize_to_alerts_with_the_event() {
        let raw = sample().alert_frame();
        let Normalized::Alert { message, event } = normalize_str(&raw, NOW_MS).unwrap() else {
            panic!("expected an alert");
        };
        assert_eq!(
            message,
            "ALERT: Magnitude 6.2 earthquake detected near central Alaska"
        );
        let event = event.unwrap();
        assert_eq!(event.id.as_deref(), Some("sim7"));
        assert!((event.magnitude - 6.2).abs() < f64::EPSILON);
    }

    #[test]
    fn shapes_cycle_through_the_sequence() {
        assert_eq!(FrameShape::for_sequence(0), FrameShape::Flat);
        assert_eq!(FrameShape::for_sequence(1), FrameShape::GeoJson);
        assert_eq!(FrameShape::for_sequence(2), FrameShape::Stringified);
        assert_eq!(FrameShape::for_sequence(3), FrameShape::Flat);
    }

    #[test]
    fn fabricated_magnitudes_stay_in_range() {
        for sequence in 0..50 {
            let event = SyntheticEvent::next(sequence, NOW_MS);
            assert!(event.magnitude >= 0.5);
            assert!(event.magnitude <= 7.5);
            assert!(!event.place.is_empty());
        }
    }

    #[test]
    fn every_fifth_event_reports_in_seconds() {
        let event = SyntheticEvent::next(4, NOW_MS);
        assert_eq!(event.time, NOW_MS / 1000);
        let event = SyntheticEvent::next(5, NOW_MS);
        assert_eq!(event.time, NOW_MS);
    }

    #[tokio::test]
    async fn simulator_emits_frames_until_closed() {
        let (tx, mut rx) = mpsc::channel(32);
        let handle = Arc::new(StreamHandle::new());
        let task = tokio::spawn(run_simulator(5, tx, Arc::clone(&handle)));

        let first = rx.recv().await.unwrap();
        assert!(normalize_str(&first, NOW_MS).is_ok());

        let _ = handle.close();
        assert!(task.await.is_ok());
    }
}
