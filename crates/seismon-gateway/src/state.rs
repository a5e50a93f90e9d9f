//! Shared application state for the gateway server.
//!
//! [`AppState`] holds the broadcast channel for live feed frames and the
//! in-memory pipeline state that the REST endpoints serve: the live event
//! store, the active filter and layer toggles, the playback controller,
//! the alert history, and the last authoritative cluster snapshot.

use std::sync::Arc;

use seismon_api::client::BackendClient;
use seismon_core::config::MonitorConfig;
use seismon_core::playback::PlaybackController;
use seismon_core::store::EventStore;
use seismon_types::{Alert, ClusterSnapshot, ClusteringConfig, Event, FilterConfig, LayerToggles};
use tokio::sync::{broadcast, RwLock};

use crate::alerts::AlertStore;

/// Capacity of the broadcast channel for feed frames.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// JSON-serializable frame pushed over the `WebSocket` feed.
///
/// Frames are tagged so one socket carries both accepted events and
/// producer alerts; subscribers dispatch on the `type` field.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedBroadcast {
    /// A normalized event accepted into the live store.
    Event {
        /// The accepted event.
        event: Event,
    },
    /// An alert raised by the upstream producer.
    Alert {
        /// The stored alert, including its local id.
        alert: Alert,
    },
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// ingest task writes events and alerts into the stores; every handler
/// reads through the same locks, so the REST view and the `WebSocket`
/// feed can never disagree about what arrived.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for live feed frames.
    pub tx: broadcast::Sender<FeedBroadcast>,
    /// The bounded live event store.
    pub store: Arc<RwLock<EventStore>>,
    /// The active event filter.
    pub filter: Arc<RwLock<FilterConfig>>,
    /// Which map layers the host UI renders.
    pub layers: Arc<RwLock<LayerToggles>>,
    /// Timelapse playback state shared with the timer task.
    pub playback: Arc<PlaybackController>,
    /// The bounded alert history.
    pub alerts: Arc<RwLock<AlertStore>>,
    /// Last authoritative cluster snapshot fetched from the backend.
    pub server_clusters: Arc<RwLock<Option<ClusterSnapshot>>>,
    /// Last known backend clustering configuration.
    pub clustering_config: Arc<RwLock<ClusteringConfig>>,
    /// Analytics backend client (absent when no backend is configured).
    pub backend: Option<Arc<BackendClient>>,
    /// The monitor configuration this state was built from.
    pub config: MonitorConfig,
}

impl AppState {
    /// Create application state from a monitor configuration, without a
    /// backend client.
    pub fn new(config: MonitorConfig) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            store: Arc::new(RwLock::new(EventStore::new(config.store.capacity))),
            filter: Arc::new(RwLock::new(FilterConfig::default())),
            layers: Arc::new(RwLock::new(LayerToggles::default())),
            playback: Arc::new(PlaybackController::new(config.playback.default_speed_ms)),
            alerts: Arc::new(RwLock::new(AlertStore::new(config.store.alert_capacity))),
            server_clusters: Arc::new(RwLock::new(None)),
            clustering_config: Arc::new(RwLock::new(config.clustering.server)),
            backend: None,
            config,
        }
    }

    /// Create application state with an analytics backend attached.
    pub fn with_backend(config: MonitorConfig, backend: Arc<BackendClient>) -> Self {
        let mut state = Self::new(config);
        state.backend = Some(backend);
        state
    }

    /// Subscribe to the feed broadcast channel.
    ///
    /// Returns a receiver that yields a [`FeedBroadcast`] frame for every
    /// event and alert the ingest task accepts.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a feed frame to all connected clients.
    ///
    /// Returns the number of receivers that received the frame. Returns 0
    /// if no clients are connected (this is not an error).
    pub fn broadcast(&self, frame: &FeedBroadcast) -> usize {
        // send returns Err only when there are zero receivers, which is
        // normal when no WebSocket clients are connected.
        self.tx.send(frame.clone()).unwrap_or(0)
    }

    /// The current filtered snapshot truncated to the playback window.
    ///
    /// Recomputes the time-sorted filtered view, refreshes the playback
    /// track length, and returns the full list when idle or the cursor
    /// prefix when playing or paused.
    pub async fn visible_events(&self) -> Vec<Event> {
        let filter = *self.filter.read().await;
        let now_ms = chrono::Utc::now().timestamp_millis();
        let mut events = self.store.read().await.snapshot(&filter, now_ms);
        self.playback.set_track_len(events.len());
        events.truncate(self.playback.visible_len());
        events
    }

    /// Recompute the filtered snapshot length and update the playback
    /// track to match.
    ///
    /// Called before playback transitions so the cursor is bounded by the
    /// list the dashboard is actually looking at.
    pub async fn refresh_track_len(&self) -> usize {
        let filter = *self.filter.read().await;
        let now_ms = chrono::Utc::now().timestamp_millis();
        let len = self.store.read().await.snapshot(&filter, now_ms).len();
        self.playback.set_track_len(len);
        len
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}
