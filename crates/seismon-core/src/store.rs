//! Bounded in-memory store for live events.
//!
//! The store keeps the most recent events in arrival order, newest first.
//! Inserting never inspects the event: deduplication, filtering, and
//! ordering are all downstream concerns. When the store is full the oldest
//! entries fall off the back.
//!
//! [`EventStore::snapshot`] produces the display view: events that pass the
//! active filter, sorted ascending by normalized timestamp. The sort is
//! stable, so events sharing a timestamp keep their arrival order.

use seismon_types::{normalize_epoch_ms, Event, FilterConfig};

use crate::filter;

/// Bounded buffer of live events, newest first.
#[derive(Debug, Clone)]
pub struct EventStore {
    events: Vec<Event>,
    capacity: usize,
}

impl EventStore {
    /// Create an empty store holding at most `capacity` events.
    pub const fn new(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            capacity,
        }
    }

    /// Insert an event at the front, evicting the oldest beyond capacity.
    pub fn insert(&mut self, event: Event) {
        self.events.insert(0, event);
        self.events.truncate(self.capacity);
    }

    /// Number of events currently held.
    pub const fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the store holds no events.
    pub const fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The configured capacity.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clone the newest `limit` events in arrival order, newest first.
    pub fn newest(&self, limit: usize) -> Vec<Event> {
        self.events.iter().take(limit).cloned().collect()
    }

    /// Build the filtered, time-sorted view of the store.
    ///
    /// Events are judged against `filter` at the single instant `now_ms`,
    /// then sorted ascending by normalized timestamp. Ties keep arrival
    /// order (earlier arrivals first). The result is a fresh `Vec`; the
    /// store itself is never reordered.
    pub fn snapshot(&self, filter: &FilterConfig, now_ms: i64) -> Vec<Event> {
        let mut passing: Vec<Event> = self
            .events
            .iter()
            .rev()
            .filter(|event| filter::passes(event, filter, now_ms))
            .cloned()
            .collect();
        passing.sort_by_key(|event| normalize_epoch_ms(event.time));
        passing
    }
}
