//! Alert history and its REST handlers.
//!
//! The upstream producer publishes an alert payload whenever a magnitude
//! crosses its threshold. The ingest task raises those here; the store
//! keeps a bounded newest-first history with an acknowledge flag.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/alerts` | List alerts (optional acknowledged/limit) |
//! | `POST` | `/api/alerts/{id}/ack` | Acknowledge an alert |

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use seismon_types::{Alert, AlertSeverity, Event};
use uuid::Uuid;

use crate::error::GatewayError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Alert store
// ---------------------------------------------------------------------------

/// Bounded in-memory alert history, newest first.
#[derive(Debug, Clone)]
pub struct AlertStore {
    alerts: Vec<Alert>,
    capacity: usize,
}

impl AlertStore {
    /// Create an empty store holding at most `capacity` alerts.
    pub const fn new(capacity: usize) -> Self {
        Self {
            alerts: Vec::new(),
            capacity,
        }
    }

    /// Add an alert to the store.
    ///
    /// New alerts go to the front; when the store exceeds its capacity
    /// the oldest alerts fall off the end.
    pub fn push(&mut self, alert: Alert) {
        self.alerts.insert(0, alert);
        if self.alerts.len() > self.capacity {
            self.alerts.truncate(self.capacity);
        }
    }

    /// Build an alert from a producer payload and store it.
    ///
    /// Severity is classified from the triggering event's magnitude;
    /// alerts without an embedded event are low severity. Returns a copy
    /// of the stored alert for broadcasting.
    pub fn raise(&mut self, message: String, event: Option<Event>, received_ms: i64) -> Alert {
        let severity = event
            .as_ref()
            .map_or(AlertSeverity::Low, |e| {
                AlertSeverity::from_magnitude(e.magnitude)
            });
        let alert = Alert {
            id: Uuid::now_v7(),
            message,
            severity,
            event,
            received_ms,
            acknowledged: false,
        };
        self.push(alert.clone());
        alert
    }

    /// All alerts, newest first.
    pub fn all(&self) -> &[Alert] {
        &self.alerts
    }

    /// Number of alerts currently held.
    pub const fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Whether the history is empty.
    pub const fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Acknowledge an alert by ID.
    ///
    /// Returns `true` if the alert was found and acknowledged, `false`
    /// if the ID was not found.
    pub fn acknowledge(&mut self, id: Uuid) -> bool {
        for alert in &mut self.alerts {
            if alert.id == id {
                alert.acknowledged = true;
                return true;
            }
        }
        false
    }
}

// ---------------------------------------------------------------------------
// REST handlers
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/alerts`.
#[derive(Debug, serde::Deserialize)]
pub struct AlertsQuery {
    /// Filter by acknowledged status (`true` or `false`).
    pub acknowledged: Option<String>,
    /// Maximum number of alerts to return (default: the full history).
    pub limit: Option<usize>,
}

/// `GET /api/alerts` -- list alerts with optional filtering.
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertsQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let store = state.alerts.read().await;
    let limit = params.limit.unwrap_or(store.len());

    let acknowledged_filter: Option<bool> = params.acknowledged.as_deref().and_then(|a| match a {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    });

    let alerts: Vec<&Alert> = store
        .all()
        .iter()
        .filter(|a| {
            if let Some(ack) = acknowledged_filter
                && a.acknowledged != ack
            {
                return false;
            }
            true
        })
        .take(limit)
        .collect();

    Ok(Json(serde_json::json!({
        "count": alerts.len(),
        "alerts": alerts,
    })))
}

/// `POST /api/alerts/{id}/ack` -- acknowledge an alert.
pub async fn acknowledge_alert(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = id_str
        .parse::<Uuid>()
        .map_err(|e| GatewayError::InvalidUuid(format!("{id_str}: {e}")))?;

    let mut store = state.alerts.write().await;
    if store.acknowledge(id) {
        Ok(Json(serde_json::json!({
            "ok": true,
            "message": format!("alert {id} acknowledged"),
        })))
    } else {
        Err(GatewayError::NotFound(format!("alert {id}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
