//! The ingest loop between the stream transport and the shared state.
//!
//! One task owns the receiving end of the frame channel. Every raw text
//! frame is normalized into an event, an alert, or nothing: accepted
//! events land in the live store and go out over the broadcast feed,
//! alerts land in the alert history and go out over the same feed. A
//! frame that fails to parse is logged and skipped, so one bad payload
//! never stalls the stream.

use std::sync::Arc;

use seismon_core::normalize::{self, Normalized};
use seismon_gateway::state::{AppState, FeedBroadcast};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Consume raw frames until the channel closes.
///
/// The loop exits when every sender has dropped its end, which happens
/// once the stream task stops after its [`StreamHandle`] closes. Each
/// frame is stamped with the wall-clock arrival time before
/// normalization so events without a usable timestamp still sort.
///
/// [`StreamHandle`]: seismon_feed::channel::StreamHandle
pub async fn run_ingest(mut frames: mpsc::Receiver<String>, state: Arc<AppState>) {
    let mut accepted: u64 = 0;
    while let Some(raw) = frames.recv().await {
        let received_ms = chrono::Utc::now().timestamp_millis();
        match normalize::normalize_str(&raw, received_ms) {
            Ok(Normalized::Event(event)) => {
                state.store.write().await.insert(event.clone());
                let track_len = state.refresh_track_len().await;
                let receivers = state.broadcast(&FeedBroadcast::Event { event });
                accepted = accepted.saturating_add(1);
                debug!(track_len, receivers, "event accepted");
            }
            Ok(Normalized::Alert { message, event }) => {
                let alert = state
                    .alerts
                    .write()
                    .await
                    .raise(message, event, received_ms);
                info!(severity = ?alert.severity, "producer alert raised");
                let _ = state.broadcast(&FeedBroadcast::Alert { alert });
            }
            Ok(Normalized::Discarded) => {
                debug!("frame carried no event or alert fields");
            }
            Err(error) => {
                warn!(%error, "malformed frame skipped");
            }
        }
    }
    info!(accepted, "ingest loop stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use seismon_types::AlertSeverity;

    fn flat_frame(id: &str, magnitude: f64, time: i64) -> String {
        serde_json::json!({
            "id": id,
            "magnitude": magnitude,
            "place": "10 km N of Testville",
            "time": time,
            "latitude": 35.0,
            "longitude": -118.0,
            "depth": 12.5,
        })
        .to_string()
    }

    /// Feed the frames through a fresh ingest task and wait for it to
    /// drain.
    async fn ingest_all(state: &Arc<AppState>, frames: Vec<String>) {
        let (tx, rx) = mpsc::channel(16);
        let task = tokio::spawn(run_ingest(rx, Arc::clone(state)));
        for frame in frames {
            tx.send(frame).await.unwrap();
        }
        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn event_frames_land_in_the_store_and_feed() {
        let state = Arc::new(AppState::default());
        let mut feed = state.subscribe();

        ingest_all(&state, vec![flat_frame("ev1", 4.2, 1_700_000_000_000)]).await;

        assert_eq!(state.store.read().await.len(), 1);
        assert_eq!(state.playback.status().track_len, 1);
        match feed.try_recv() {
            Ok(FeedBroadcast::Event { event }) => {
                assert_eq!(event.id.as_deref(), Some("ev1"));
            }
            other => panic!("expected an event frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn alert_frames_go_to_the_history_not_the_store() {
        let state = Arc::new(AppState::default());
        let mut feed = state.subscribe();

        let alert = serde_json::json!({
            "message": "Strong earthquake detected",
            "event": {
                "id": "ev-big",
                "magnitude": 6.3,
                "place": "offshore",
                "time": 1_700_000_100_000_i64,
                "latitude": 38.0,
                "longitude": 142.0,
            },
        })
        .to_string();
        ingest_all(&state, vec![alert]).await;

        assert!(state.store.read().await.is_empty());
        let alerts = state.alerts.read().await;
        assert_eq!(alerts.len(), 1);
        match feed.try_recv() {
            Ok(FeedBroadcast::Alert { alert }) => {
                assert_eq!(alert.severity, AlertSeverity::High);
                assert!(!alert.acknowledged);
            }
            other => panic!("expected an alert frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_frames_do_not_stall_the_stream() {
        let state = Arc::new(AppState::default());

        ingest_all(
            &state,
            vec![
                "not json at all".to_owned(),
                flat_frame("ev2", 3.1, 1_700_000_200_000),
            ],
        )
        .await;

        assert_eq!(state.store.read().await.len(), 1);
    }

    #[tokio::test]
    async fn unrecognized_frames_change_nothing() {
        let state = Arc::new(AppState::default());

        ingest_all(
            &state,
            vec![serde_json::json!({ "heartbeat": true }).to_string()],
        )
        .await;

        assert!(state.store.read().await.is_empty());
        assert!(state.alerts.read().await.is_empty());
    }

    #[tokio::test]
    async fn the_store_stays_bounded_under_load() {
        let state = Arc::new(AppState::default());
        let capacity = state.config.store.capacity;

        let frames: Vec<String> = (0..capacity.saturating_add(10))
            .map(|i| {
                let time = 1_700_000_000_000_i64.saturating_add(i64::try_from(i).unwrap_or(0));
                flat_frame(&format!("ev{i}"), 2.5, time)
            })
            .collect();
        ingest_all(&state, frames).await;

        assert_eq!(state.store.read().await.len(), capacity);
    }
}
