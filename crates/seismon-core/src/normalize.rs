//! Normalizing heterogeneous wire frames into canonical events.
//!
//! The feed carries three shapes that all describe the same thing: raw
//! `GeoJSON` features (`properties` + `geometry.coordinates`), flat records
//! republished by workers, and alert payloads that nest the triggering
//! record under `event` with every numeric stringified. Rather than
//! guessing the shape up front, each canonical field carries an ordered
//! list of extraction paths and the first defined value wins.
//!
//! Outcomes are total: a frame either yields an [`Event`], an alert, or is
//! discarded. Only a frame that is not JSON at all is an error, and the
//! caller is expected to log it and move on.

use serde_json::Value;

use seismon_types::{normalize_epoch_ms, Event};

// ---------------------------------------------------------------------------
// Outcomes and errors
// ---------------------------------------------------------------------------

/// Outcome of normalizing one wire frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// The frame mapped to a canonical event.
    Event(Event),
    /// The frame was an alert notification.
    Alert {
        /// Human-readable alert text from the upstream producer.
        message: String,
        /// The triggering event, when the payload embedded one.
        event: Option<Event>,
    },
    /// The frame was valid JSON but carried no event or alert fields.
    Discarded,
}

/// A raw frame that is not valid JSON at all.
#[derive(Debug, thiserror::Error)]
#[error("malformed wire frame: {source}")]
pub struct MalformedFrame {
    #[from]
    source: serde_json::Error,
}

// ---------------------------------------------------------------------------
// Extraction paths
// ---------------------------------------------------------------------------

/// One step of an extraction path.
#[derive(Debug, Clone, Copy)]
enum Step {
    /// Descend into an object key.
    Key(&'static str),
    /// Descend into an array element.
    Idx(usize),
}

use Step::{Idx, Key};

/// The ordered extraction paths tried for one canonical field.
type Paths = &'static [&'static [Step]];

const ID_PATHS: Paths = &[
    &[Key("id")],
    &[Key("properties"), Key("id")],
    &[Key("event"), Key("id")],
];

const MAGNITUDE_PATHS: Paths = &[
    &[Key("properties"), Key("mag")],
    &[Key("magnitude")],
    &[Key("event"), Key("magnitude")],
];

const PLACE_PATHS: Paths = &[
    &[Key("place")],
    &[Key("properties"), Key("place")],
    &[Key("event"), Key("place")],
];

const TIME_PATHS: Paths = &[
    &[Key("time")],
    &[Key("properties"), Key("time")],
    &[Key("event"), Key("time")],
];

const LATITUDE_PATHS: Paths = &[
    &[Key("geometry"), Key("coordinates"), Idx(1)],
    &[Key("latitude")],
    &[Key("event"), Key("latitude")],
];

const LONGITUDE_PATHS: Paths = &[
    &[Key("geometry"), Key("coordinates"), Idx(0)],
    &[Key("longitude")],
    &[Key("event"), Key("longitude")],
];

const DEPTH_PATHS: Paths = &[
    &[Key("geometry"), Key("coordinates"), Idx(2)],
    &[Key("depth")],
    &[Key("event"), Key("depth")],
];

const URL_PATHS: Paths = &[
    &[Key("url")],
    &[Key("properties"), Key("url")],
    &[Key("event"), Key("url")],
];

const MESSAGE_PATHS: Paths = &[&[Key("message")]];

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Normalize a raw text frame.
///
/// `received_ms` is the arrival wall-clock in epoch milliseconds. It is
/// used as the event timestamp when the frame carries none, so late
/// inspection still places the event on the timeline.
///
/// # Errors
///
/// Returns [`MalformedFrame`] when the text is not parseable JSON. The
/// caller should log the frame and continue with the next one.
pub fn normalize_str(raw: &str, received_ms: i64) -> Result<Normalized, MalformedFrame> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(normalize_value(&value, received_ms))
}

/// Normalize an already-parsed JSON frame.
///
/// A frame with a top-level `message` is an alert; any embedded event is
/// extracted through the same paths as a standalone frame. A frame with
/// no message and no recognizable event fields is [`Normalized::Discarded`].
pub fn normalize_value(value: &Value, received_ms: i64) -> Normalized {
    if let Some(message) = first_string(value, MESSAGE_PATHS) {
        return Normalized::Alert {
            message,
            event: extract_event(value, received_ms),
        };
    }

    match extract_event(value, received_ms) {
        Some(event) => Normalized::Event(event),
        None => Normalized::Discarded,
    }
}

// ---------------------------------------------------------------------------
// Field assembly
// ---------------------------------------------------------------------------

/// Assemble a canonical event, or `None` when the frame has no identifying
/// fields at all (no id, magnitude, timestamp, or coordinate pair).
fn extract_event(value: &Value, received_ms: i64) -> Option<Event> {
    let id = first_string(value, ID_PATHS);
    let magnitude = first_f64(value, MAGNITUDE_PATHS);
    let time_raw = first_i64(value, TIME_PATHS);
    let latitude = first_f64(value, LATITUDE_PATHS);
    let longitude = first_f64(value, LONGITUDE_PATHS);

    let recognizable = id.is_some()
        || magnitude.is_some()
        || time_raw.is_some()
        || (latitude.is_some() && longitude.is_some());
    if !recognizable {
        return None;
    }

    Some(Event {
        id,
        magnitude: magnitude.filter(|m| m.is_finite()).unwrap_or(0.0).max(0.0),
        place: first_string(value, PLACE_PATHS).unwrap_or_default(),
        time: time_raw.map_or(received_ms, normalize_epoch_ms),
        latitude,
        longitude,
        depth: first_f64(value, DEPTH_PATHS),
        url: first_string(value, URL_PATHS),
    })
}

/// Walk one path into the value.
fn walk<'a>(value: &'a Value, path: &[Step]) -> Option<&'a Value> {
    let mut current = value;
    for step in path {
        current = match *step {
            Step::Key(key) => current.get(key)?,
            Step::Idx(idx) => current.get(idx)?,
        };
    }
    Some(current)
}

/// First path that yields a non-empty string. Numbers are accepted and
/// rendered, since some producers stringify ids and others do not.
fn first_string(value: &Value, paths: Paths) -> Option<String> {
    paths.iter().find_map(|path| {
        walk(value, path).and_then(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    })
}

/// First path that yields a float, accepting numeric strings.
fn first_f64(value: &Value, paths: Paths) -> Option<f64> {
    paths.iter().find_map(|path| walk(value, path).and_then(value_to_f64))
}

/// First path that yields an integer, accepting numeric strings and
/// truncating float-typed timestamps.
fn first_i64(value: &Value, paths: Paths) -> Option<i64> {
    paths.iter().find_map(|path| walk(value, path).and_then(value_to_i64))
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const RECEIVED_MS: i64 = 1_710_000_000_000;

    fn normalize(raw: &str) -> Normalized {
        normalize_str(raw, RECEIVED_MS).unwrap()
    }

    fn expect_event(outcome: Normalized) -> Event {
        match outcome {
            Normalized::Event(event) => event,
            other => panic!("expected an event, got {other:?}"),
        }
    }

    #[test]
    fn flat_frame_maps_directly() {
        let raw = r#"{
            "id": "us7000abcd",
            "magnitude": 5.4,
            "place": "22 km W of Petrolia, CA",
            "time": 1700000000000,
            "latitude": 40.3,
            "longitude": -124.4,
            "depth": 17.2,
            "url": "https://example.org/us7000abcd"
        }"#;
        let event = expect_event(normalize(raw));
        assert_eq!(event.id.as_deref(), Some("us7000abcd"));
        assert!((event.magnitude - 5.4).abs() < f64::EPSILON);
        assert_eq!(event.place, "22 km W of Petrolia, CA");
        assert_eq!(event.time, 1_700_000_000_000);
        assert_eq!(event.plot_position(), Some((40.3, -124.4)));
        assert_eq!(event.url.as_deref(), Some("https://example.org/us7000abcd"));
    }

    #[test]
    fn geojson_feature_uses_properties_and_geometry() {
        let raw = r#"{
            "id": "ci40123456",
            "properties": {
                "mag": 3.2,
                "place": "10 km NE of Ridgecrest, CA",
                "time": 1700000100000,
                "url": "https://example.org/ci40123456"
            },
            "geometry": {
                "type": "Point",
                "coordinates": [-117.5, 35.7, 8.1]
            }
        }"#;
        let event = expect_event(normalize(raw));
        assert_eq!(event.id.as_deref(), Some("ci40123456"));
        assert!((event.magnitude - 3.2).abs() < f64::EPSILON);
        assert_eq!(event.plot_position(), Some((35.7, -117.5)));
        assert_eq!(event.depth, Some(8.1));
        assert_eq!(event.time, 1_700_000_100_000);
    }

    #[test]
    fn geometry_coordinates_outrank_flat_fields() {
        // A frame carrying both shapes must prefer the geometry block for
        // coordinates and the properties block for magnitude.
        let raw = r#"{
            "magnitude": 9.9,
            "latitude": 1.0,
            "longitude": 2.0,
            "properties": {"mag": 4.4},
            "geometry": {"coordinates": [-120.0, 45.0, 10.0]}
        }"#;
        let event = expect_event(normalize(raw));
        assert!((event.magnitude - 4.4).abs() < f64::EPSILON);
        assert_eq!(event.plot_position(), Some((45.0, -120.0)));
    }

    #[test]
    fn flat_place_outranks_properties_place() {
        let raw = r#"{
            "id": "x",
            "place": "flat wins",
            "properties": {"place": "nested loses"}
        }"#;
        let event = expect_event(normalize(raw));
        assert_eq!(event.place, "flat wins");
    }

    #[test]
    fn stringified_numerics_are_coerced() {
        // Worker republishes stringify every numeric field.
        let raw = r#"{
            "id": "us7000wxyz",
            "magnitude": "6.1",
            "place": "Kermadec Islands",
            "time": "1700000200000",
            "latitude": "-29.8",
            "longitude": "-176.2",
            "depth": "45.0"
        }"#;
        let event = expect_event(normalize(raw));
        assert!((event.magnitude - 6.1).abs() < f64::EPSILON);
        assert_eq!(event.time, 1_700_000_200_000);
        assert_eq!(event.plot_position(), Some((-29.8, -176.2)));
        assert_eq!(event.depth, Some(45.0));
    }

    #[test]
    fn second_resolution_timestamps_are_scaled() {
        let raw = r#"{"id": "x", "time": 1700000000}"#;
        let event = expect_event(normalize(raw));
        assert_eq!(event.time, 1_700_000_000_000);
    }

    #[test]
    fn missing_timestamp_falls_back_to_received_time() {
        let raw = r#"{"id": "x", "magnitude": 2.0}"#;
        let event = expect_event(normalize(raw));
        assert_eq!(event.time, RECEIVED_MS);
    }

    #[test]
    fn missing_magnitude_defaults_to_zero() {
        let raw = r#"{"id": "x"}"#;
        let event = expect_event(normalize(raw));
        assert!(event.magnitude.abs() < f64::EPSILON);
    }

    #[test]
    fn unparseable_magnitude_defaults_to_zero() {
        let raw = r#"{"id": "x", "magnitude": "shallow"}"#;
        let event = expect_event(normalize(raw));
        assert!(event.magnitude.abs() < f64::EPSILON);
    }

    #[test]
    fn alert_frame_extracts_message_and_embedded_event() {
        let raw = r#"{
            "event": {
                "id": "us6000alert",
                "magnitude": "6.8",
                "place": "near the coast of Chile",
                "time": "1700000300000",
                "latitude": "-33.0",
                "longitude": "-71.6",
                "depth": "30.0"
            },
            "message": "ALERT: Magnitude 6.8 earthquake detected near the coast of Chile"
        }"#;
        let Normalized::Alert { message, event } = normalize(raw) else {
            panic!("expected an alert");
        };
        assert!(message.starts_with("ALERT: Magnitude 6.8"));
        let event = event.unwrap();
        assert_eq!(event.id.as_deref(), Some("us6000alert"));
        assert!((event.magnitude - 6.8).abs() < f64::EPSILON);
        assert_eq!(event.plot_position(), Some((-33.0, -71.6)));
    }

    #[test]
    fn alert_without_embedded_event_still_carries_the_message() {
        let raw = r#"{"message": "ALERT: sensor network degraded"}"#;
        let Normalized::Alert { message, event } = normalize(raw) else {
            panic!("expected an alert");
        };
        assert_eq!(message, "ALERT: sensor network degraded");
        assert!(event.is_none());
    }

    #[test]
    fn unrecognizable_frame_is_discarded() {
        assert_eq!(normalize(r#"{"foo": "bar"}"#), Normalized::Discarded);
        assert_eq!(normalize("[1, 2, 3]"), Normalized::Discarded);
        assert_eq!(normalize(r#""just a string""#), Normalized::Discarded);
    }

    #[test]
    fn coordinates_alone_are_recognizable() {
        let raw = r#"{"latitude": 10.0, "longitude": 20.0}"#;
        let event = expect_event(normalize(raw));
        assert_eq!(event.plot_position(), Some((10.0, 20.0)));
        assert!(event.id.is_none());
    }

    #[test]
    fn one_coordinate_alone_is_not_recognizable() {
        assert_eq!(normalize(r#"{"latitude": 10.0}"#), Normalized::Discarded);
    }

    #[test]
    fn non_json_frame_is_an_error() {
        let result = normalize_str("not json at all", RECEIVED_MS);
        assert!(result.is_err());
    }

    #[test]
    fn null_fields_fall_through_to_later_paths() {
        let raw = r#"{
            "id": null,
            "magnitude": null,
            "properties": {"id": "nested", "mag": 4.0}
        }"#;
        let event = expect_event(normalize(raw));
        assert_eq!(event.id.as_deref(), Some("nested"));
        assert!((event.magnitude - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn float_timestamps_are_truncated() {
        let raw = r#"{"id": "x", "time": 1700000000123.9}"#;
        let event = expect_event(normalize(raw));
        assert_eq!(event.time, 1_700_000_000_123);
    }
}
