//! Alert records raised for significant events.
//!
//! The upstream producer publishes an alert payload (a `message` plus the
//! triggering event) whenever a magnitude crosses its threshold. The
//! pipeline keeps a bounded history of these with an acknowledge flag.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Alert severity derived from the triggering magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AlertSeverity {
    /// Magnitude 6.0 and above.
    High,
    /// Magnitude 5.0 to 5.9.
    Medium,
    /// Everything below 5.0.
    Low,
}

impl AlertSeverity {
    /// Classifies a magnitude into a severity.
    pub const fn from_magnitude(magnitude: f64) -> Self {
        if magnitude >= 6.0 {
            Self::High
        } else if magnitude >= 5.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// One alert in the history buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Alert {
    /// Locally generated identifier (the wire payload carries none).
    pub id: Uuid,
    /// Human-readable alert text from the producer.
    pub message: String,
    /// Severity derived from the triggering event's magnitude.
    pub severity: AlertSeverity,
    /// The triggering event, when the payload embedded one.
    pub event: Option<crate::event::Event>,
    /// When the pipeline received the alert, epoch milliseconds.
    pub received_ms: i64,
    /// Whether an operator has acknowledged the alert.
    pub acknowledged: bool,
}
