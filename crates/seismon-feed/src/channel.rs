//! The single live stream connection with reconnect backoff.
//!
//! One task owns one WebSocket at a time. When the connection drops or
//! cannot be established, the task waits out the backoff delay and dials
//! again; nothing is buffered across an outage, so the event history is
//! exactly what arrived while connected. Frames are forwarded as raw text
//! for the ingest side to normalize.
//!
//! Teardown goes through [`StreamHandle`]: closing flips a flag and wakes
//! the task, which shuts the socket and exits. Closing twice is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use seismon_core::retry::{ReconnectPolicy, CONSTRUCT_RETRY_MS};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

/// Shutdown handle shared between the stream task and its owner.
#[derive(Debug, Default)]
pub struct StreamHandle {
    closed: AtomicBool,
    notify: Notify,
}

impl StreamHandle {
    /// A fresh, open handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the stream task to stop.
    ///
    /// Idempotent: returns `true` only for the call that actually closed
    /// the handle, `false` for every call after that.
    pub fn close(&self) -> bool {
        let first = !self.closed.swap(true, Ordering::AcqRel);
        if first {
            self.notify.notify_waiters();
        }
        first
    }

    /// Whether the handle has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Wait until the handle is closed.
    async fn closed_wait(&self) {
        while !self.is_closed() {
            self.notify.notified().await;
        }
    }
}

/// Run the live connection until the handle closes.
///
/// Reconnect delays double per consecutive failure and reset the moment a
/// connection opens. A URL that cannot even be parsed retries on a flat
/// [`CONSTRUCT_RETRY_MS`] without touching the backoff counter.
pub async fn run_channel(url: String, frames: mpsc::Sender<String>, handle: Arc<StreamHandle>) {
    let mut policy = ReconnectPolicy::new();

    while !handle.is_closed() {
        let target = match Url::parse(&url) {
            Ok(target) => target,
            Err(error) => {
                warn!(%error, url, "stream url is invalid, retrying");
                if wait_or_closed(&handle, CONSTRUCT_RETRY_MS).await {
                    break;
                }
                continue;
            }
        };

        let dialed = tokio::select! {
            () = handle.closed_wait() => break,
            dialed = tokio_tungstenite::connect_async(target.as_str()) => dialed,
        };

        match dialed {
            Ok((socket, _response)) => {
                policy.connection_opened();
                info!(url, "stream connected");
                if read_frames(socket, &frames, &handle).await {
                    break;
                }
            }
            Err(error) => {
                warn!(%error, url, "stream connect failed");
            }
        }

        if handle.is_closed() {
            break;
        }
        let delay_ms = policy.next_delay_ms();
        info!(delay_ms, failures = policy.failures(), "stream down, reconnecting");
        if wait_or_closed(&handle, delay_ms).await {
            break;
        }
    }

    info!(url, "stream task stopped");
}

/// Pump frames from one connection until it drops or the handle closes.
///
/// Returns `true` when the handle closed (the channel loop should exit)
/// and `false` when the connection itself ended (the loop should redial).
async fn read_frames(
    mut socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    frames: &mpsc::Sender<String>,
    handle: &StreamHandle,
) -> bool {
    loop {
        tokio::select! {
            () = handle.closed_wait() => {
                let _ = socket.close(None).await;
                return true;
            }
            frame = socket.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if frames.send(text.to_string()).await.is_err() {
                        // Receiver side is gone; the pipeline is shutting down.
                        return true;
                    }
                }
                Some(Ok(Message::Ping(payload))) => {
                    if socket.send(Message::Pong(payload)).await.is_err() {
                        return false;
                    }
                }
                Some(Ok(Message::Close(reason))) => {
                    debug!(?reason, "server closed the stream");
                    return false;
                }
                Some(Ok(other)) => {
                    debug!(kind = ?other, "ignoring non-text frame");
                }
                Some(Err(error)) => {
                    warn!(%error, "stream read error");
                    return false;
                }
                None => return false,
            }
        }
    }
}

/// Sleep for `delay_ms`, waking early if the handle closes.
///
/// Returns whether the handle is closed when the wait ends.
pub(crate) async fn wait_or_closed(handle: &StreamHandle, delay_ms: u64) -> bool {
    tokio::select! {
        () = handle.closed_wait() => true,
        () = tokio::time::sleep(Duration::from_millis(delay_ms)) => handle.is_closed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_is_idempotent() {
        let handle = StreamHandle::new();
        assert!(!handle.is_closed());
        assert!(handle.close());
        assert!(!handle.close());
        assert!(!handle.close());
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn closing_stops_the_channel_task() {
        // Nothing listens on this port; the task sits in its backoff wait.
        let (tx, _rx) = mpsc::channel(8);
        let handle = Arc::new(StreamHandle::new());
        let task = tokio::spawn(run_channel(
            "ws://127.0.0.1:9/feed".to_owned(),
            tx,
            Arc::clone(&handle),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.close());
        assert!(task.await.is_ok());
    }

    #[tokio::test]
    async fn closing_before_start_exits_immediately() {
        let (tx, _rx) = mpsc::channel(8);
        let handle = Arc::new(StreamHandle::new());
        let _ = handle.close();
        run_channel("ws://127.0.0.1:9/feed".to_owned(), tx, handle).await;
    }

    #[tokio::test]
    async fn invalid_url_keeps_retrying_until_closed() {
        let (tx, _rx) = mpsc::channel(8);
        let handle = Arc::new(StreamHandle::new());
        let task = tokio::spawn(run_channel(
            "not a url".to_owned(),
            tx,
            Arc::clone(&handle),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!task.is_finished());
        let _ = handle.close();
        assert!(task.await.is_ok());
    }
}
