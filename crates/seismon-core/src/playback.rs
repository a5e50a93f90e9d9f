//! Timelapse playback state over the visible event list.
//!
//! The controller holds three pieces of state: a playing flag, a cursor
//! into the time-sorted visible list, and the tick interval. All fields are
//! atomics wrapped in [`Arc`] so the HTTP handlers and the timer task share
//! them without locks.
//!
//! States, by cursor position and flag:
//!
//! - **Idle** -- not playing, cursor at the track end. The full list is
//!   visible. This is the resting state; live inserts keep the cursor
//!   pinned to the growing end.
//! - **Playing** -- the cursor advances one step per tick and the visible
//!   list is the prefix below it.
//! - **Paused** -- not playing, cursor somewhere inside the track. Entered
//!   by an explicit pause or by scrubbing. The prefix stays frozen until
//!   resumed.
//!
//! Exactly one timer task drives the cursor. Every transition that stops
//! playback bumps a generation counter; a timer that wakes under a stale
//! generation exits without touching the cursor, so a pause-play-pause
//! burst can never leave two timers racing.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

/// Shared playback state between control handlers and the timer task.
#[derive(Debug)]
pub struct PlaybackController {
    /// Whether the timer is advancing the cursor.
    playing: AtomicBool,

    /// Cursor into the visible list; `cursor >= track_len` means idle.
    cursor: AtomicUsize,

    /// Tick interval in milliseconds (runtime-adjustable).
    speed_ms: AtomicU64,

    /// Length of the visible list the cursor indexes into.
    track_len: AtomicUsize,

    /// Timer generation; stale timers compare and exit.
    generation: AtomicU64,
}

/// JSON-serializable playback status for the control API.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackStatus {
    /// Whether playback is running.
    pub playing: bool,
    /// Current cursor position.
    pub cursor: usize,
    /// Current tick interval in milliseconds.
    pub speed_ms: u64,
    /// Length of the track the cursor indexes into.
    pub track_len: usize,
    /// Whether the controller is in the idle (live) state.
    pub idle: bool,
}

impl PlaybackController {
    /// Create an idle controller with the given tick interval.
    pub const fn new(speed_ms: u64) -> Self {
        Self {
            playing: AtomicBool::new(false),
            cursor: AtomicUsize::new(0),
            speed_ms: AtomicU64::new(speed_ms),
            track_len: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Whether the timer is currently advancing the cursor.
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Whether the controller is idle (not playing, cursor at the end).
    pub fn is_idle(&self) -> bool {
        !self.is_playing()
            && self.cursor.load(Ordering::Acquire) >= self.track_len.load(Ordering::Acquire)
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Current tick interval in milliseconds.
    pub fn speed_ms(&self) -> u64 {
        self.speed_ms.load(Ordering::Acquire)
    }

    /// Current timer generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// How many events of the track are visible right now: the whole track
    /// when idle, otherwise the prefix below the cursor.
    pub fn visible_len(&self) -> usize {
        let len = self.track_len.load(Ordering::Acquire);
        if self.is_idle() {
            len
        } else {
            self.cursor.load(Ordering::Acquire).min(len)
        }
    }

    /// Snapshot the full status for the control API.
    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            playing: self.is_playing(),
            cursor: self.cursor(),
            speed_ms: self.speed_ms(),
            track_len: self.track_len.load(Ordering::Acquire),
            idle: self.is_idle(),
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Start or resume playback.
    ///
    /// A cursor at or past the track end restarts from zero; a paused
    /// cursor resumes in place. Returns `true` when this call started
    /// playback (the caller must then spawn [`run_playback`]), `false`
    /// when playback was already running.
    pub fn play(&self) -> bool {
        let len = self.track_len.load(Ordering::Acquire);
        if self.cursor.load(Ordering::Acquire) >= len {
            self.cursor.store(0, Ordering::Release);
        }
        let was_playing = self.playing.swap(true, Ordering::AcqRel);
        if !was_playing {
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
        !was_playing
    }

    /// Pause playback, keeping the cursor where it is.
    pub fn pause(&self) {
        self.playing.store(false, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Jump the cursor to `index` (clamped to the track) and force a pause.
    pub fn scrub(&self, index: usize) {
        self.playing.store(false, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
        let len = self.track_len.load(Ordering::Acquire);
        self.cursor.store(index.min(len), Ordering::Release);
    }

    /// Set the tick interval in milliseconds. Zero is rejected.
    ///
    /// Returns the previous interval on success, or `None` if the value
    /// was rejected. The new interval applies from the next tick's sleep.
    pub fn set_speed_ms(&self, speed_ms: u64) -> Option<u64> {
        if speed_ms == 0 {
            return None;
        }
        Some(self.speed_ms.swap(speed_ms, Ordering::AcqRel))
    }

    /// Update the track length after the visible list changed.
    ///
    /// An idle cursor follows the end so the live view keeps showing
    /// everything. A paused or playing cursor is only clamped when the
    /// track shrank beneath it.
    pub fn set_track_len(&self, len: usize) {
        let was_idle = self.is_idle();
        self.track_len.store(len, Ordering::Release);
        if was_idle {
            self.cursor.store(len, Ordering::Release);
        } else if self.cursor.load(Ordering::Acquire) > len {
            self.cursor.store(len, Ordering::Release);
        }
    }

    /// Advance the cursor one step.
    ///
    /// Returns `false` when the cursor reached the track end; playback
    /// stops there with the cursor parked exactly at the end, never past it.
    pub fn advance_once(&self) -> bool {
        let len = self.track_len.load(Ordering::Acquire);
        let next = self.cursor.load(Ordering::Acquire).saturating_add(1);
        if next >= len {
            self.cursor.store(len, Ordering::Release);
            self.playing.store(false, Ordering::Release);
            return false;
        }
        self.cursor.store(next, Ordering::Release);
        true
    }
}

/// Drive the playback cursor until it stops.
///
/// One task per playback session: spawned when [`PlaybackController::play`]
/// returns `true` and exits when the cursor reaches the end, playback is
/// paused, or the generation moves on (a newer session took over). The tick
/// interval is re-read every iteration so speed changes apply immediately.
pub async fn run_playback(controller: Arc<PlaybackController>) {
    let generation = controller.generation();
    loop {
        let speed_ms = controller.speed_ms();
        tokio::time::sleep(Duration::from_millis(speed_ms)).await;

        if controller.generation() != generation || !controller.is_playing() {
            debug!(generation, "playback timer superseded");
            return;
        }

        if !controller.advance_once() {
            debug!(cursor = controller.cursor(), "playback reached track end");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_with_full_visibility() {
        let controller = PlaybackController::new(500);
        controller.set_track_len(10);
        assert!(controller.is_idle());
        assert!(!controller.is_playing());
        assert_eq!(controller.visible_len(), 10);
    }

    #[test]
    fn play_from_idle_restarts_at_zero() {
        let controller = PlaybackController::new(500);
        controller.set_track_len(10);
        assert!(controller.play());
        assert_eq!(controller.cursor(), 0);
        assert!(controller.is_playing());
    }

    #[test]
    fn play_while_playing_does_not_spawn_again() {
        let controller = PlaybackController::new(500);
        controller.set_track_len(10);
        assert!(controller.play());
        assert!(!controller.play());
    }

    #[test]
    fn pause_keeps_the_cursor() {
        let controller = PlaybackController::new(500);
        controller.set_track_len(10);
        let _ = controller.play();
        let _ = controller.advance_once();
        let _ = controller.advance_once();
        controller.pause();
        assert!(!controller.is_playing());
        assert_eq!(controller.cursor(), 2);
        assert_eq!(controller.visible_len(), 2);
    }

    #[test]
    fn resume_continues_from_the_paused_cursor() {
        let controller = PlaybackController::new(500);
        controller.set_track_len(10);
        let _ = controller.play();
        let _ = controller.advance_once();
        controller.pause();
        let _ = controller.play();
        assert_eq!(controller.cursor(), 1);
    }

    #[test]
    fn scrub_forces_a_pause_and_clamps() {
        let controller = PlaybackController::new(500);
        controller.set_track_len(10);
        let _ = controller.play();
        controller.scrub(7);
        assert!(!controller.is_playing());
        assert_eq!(controller.cursor(), 7);
        assert_eq!(controller.visible_len(), 7);

        controller.scrub(99);
        assert_eq!(controller.cursor(), 10);
    }

    #[test]
    fn zero_speed_is_rejected() {
        let controller = PlaybackController::new(500);
        assert!(controller.set_speed_ms(0).is_none());
        assert_eq!(controller.speed_ms(), 500);
        assert_eq!(controller.set_speed_ms(250), Some(500));
        assert_eq!(controller.speed_ms(), 250);
    }

    #[test]
    fn idle_cursor_follows_a_growing_track() {
        let controller = PlaybackController::new(500);
        controller.set_track_len(5);
        assert_eq!(controller.visible_len(), 5);
        controller.set_track_len(8);
        assert!(controller.is_idle());
        assert_eq!(controller.visible_len(), 8);
    }

    #[test]
    fn paused_cursor_holds_while_the_track_grows() {
        let controller = PlaybackController::new(500);
        controller.set_track_len(5);
        controller.scrub(3);
        controller.set_track_len(9);
        assert_eq!(controller.cursor(), 3);
        assert_eq!(controller.visible_len(), 3);
    }

    #[test]
    fn shrinking_track_clamps_a_paused_cursor() {
        let controller = PlaybackController::new(500);
        controller.set_track_len(10);
        controller.scrub(8);
        controller.set_track_len(4);
        assert_eq!(controller.cursor(), 4);
    }

    #[tokio::test]
    async fn playback_advances_and_stops_at_the_track_end() {
        let controller = Arc::new(PlaybackController::new(100));
        controller.set_track_len(5);
        assert!(controller.play());
        assert_eq!(controller.cursor(), 0);

        run_playback(Arc::clone(&controller)).await;

        assert_eq!(controller.cursor(), 5);
        assert!(!controller.is_playing());
        assert!(controller.is_idle());
        assert_eq!(controller.visible_len(), 5);
    }

    #[tokio::test]
    async fn paused_timer_exits_without_advancing() {
        let controller = Arc::new(PlaybackController::new(50));
        controller.set_track_len(100);
        assert!(controller.play());
        let timer = tokio::spawn(run_playback(Arc::clone(&controller)));

        controller.pause();
        let cursor_at_pause = controller.cursor();
        assert!(timer.await.is_ok());
        assert_eq!(controller.cursor(), cursor_at_pause);
    }

    #[tokio::test]
    async fn stale_timer_exits_when_a_new_session_takes_over() {
        let controller = Arc::new(PlaybackController::new(50));
        controller.set_track_len(100);
        assert!(controller.play());
        let stale_timer = tokio::spawn(run_playback(Arc::clone(&controller)));

        // Scrub pauses and moves the generation on; the play that follows
        // starts a new session. The first timer is now stale even though
        // playback is running again, so it must exit without advancing.
        controller.scrub(42);
        assert!(controller.play());

        assert!(stale_timer.await.is_ok());
        assert_eq!(controller.cursor(), 42);
        assert!(controller.is_playing());
    }
}
