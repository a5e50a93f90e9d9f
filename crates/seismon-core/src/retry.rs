//! Reconnect backoff and bounded poll schedules.
//!
//! Two small state machines used by the stream channel and the clustering
//! refresher:
//!
//! - [`ReconnectPolicy`] -- exponential backoff for the single live
//!   connection. The delay doubles per consecutive failure, capped at
//!   [`BACKOFF_CAP_MS`], and resets as soon as a connection opens.
//! - [`PollBudget`] -- a fixed schedule of refresh attempts after a
//!   clustering configuration change. The server recomputes asynchronously,
//!   so the client polls a bounded number of times and then stops whether
//!   or not fresh data showed up.

/// Base reconnect delay, doubled per consecutive failure.
pub const BACKOFF_BASE_MS: u64 = 1_000;

/// Upper bound on the reconnect delay.
pub const BACKOFF_CAP_MS: u64 = 30_000;

/// Flat retry delay when the transport could not even be constructed.
pub const CONSTRUCT_RETRY_MS: u64 = 2_000;

/// Exponential backoff state for the live connection.
#[derive(Debug, Default)]
pub struct ReconnectPolicy {
    failures: u32,
}

impl ReconnectPolicy {
    /// Fresh policy with no recorded failures.
    pub const fn new() -> Self {
        Self { failures: 0 }
    }

    /// Delay in milliseconds before the next reconnect attempt.
    ///
    /// Computed from the failure count before this one, so the first
    /// failure waits the base delay: 1s, 2s, 4s, 8s, ... capped at
    /// [`BACKOFF_CAP_MS`].
    pub fn next_delay_ms(&mut self) -> u64 {
        let factor = 1_u64.checked_shl(self.failures).unwrap_or(u64::MAX);
        let delay = factor.saturating_mul(BACKOFF_BASE_MS).min(BACKOFF_CAP_MS);
        self.failures = self.failures.saturating_add(1);
        delay
    }

    /// Reset the failure count after a successful open.
    pub fn connection_opened(&mut self) {
        self.failures = 0;
    }

    /// Consecutive failures recorded so far.
    pub const fn failures(&self) -> u32 {
        self.failures
    }
}

/// Bounded poll schedule after a clustering configuration change.
///
/// Yields an initial delay for the first attempt, then a fixed interval
/// for each remaining attempt, then `None`. Every attempt in the budget
/// runs; arrival of fresh data does not cut the schedule short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    attempts_remaining: u32,
    interval_ms: u64,
    initial_delay_ms: u64,
    started: bool,
}

impl PollBudget {
    /// A budget of `attempts` polls.
    pub const fn new(attempts: u32, interval_ms: u64, initial_delay_ms: u64) -> Self {
        Self {
            attempts_remaining: attempts,
            interval_ms,
            initial_delay_ms,
            started: false,
        }
    }

    /// Milliseconds to wait before the next attempt, consuming one unit
    /// of budget. `None` once the budget is exhausted.
    pub fn next_wait_ms(&mut self) -> Option<u64> {
        if self.attempts_remaining == 0 {
            return None;
        }
        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
        let wait = if self.started {
            self.interval_ms
        } else {
            self.initial_delay_ms
        };
        self.started = true;
        Some(wait)
    }

    /// Whether the budget has been fully consumed.
    pub const fn is_exhausted(&self) -> bool {
        self.attempts_remaining == 0
    }

    /// Attempts left in the budget.
    pub const fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let mut policy = ReconnectPolicy::new();
        let delays: Vec<u64> = (0..7).map(|_| policy.next_delay_ms()).collect();
        assert_eq!(
            delays,
            vec![1_000, 2_000, 4_000, 8_000, 16_000, 30_000, 30_000]
        );
    }

    #[test]
    fn successful_open_resets_the_backoff() {
        let mut policy = ReconnectPolicy::new();
        let _ = policy.next_delay_ms();
        let _ = policy.next_delay_ms();
        let _ = policy.next_delay_ms();
        assert_eq!(policy.failures(), 3);

        policy.connection_opened();
        assert_eq!(policy.failures(), 0);
        assert_eq!(policy.next_delay_ms(), 1_000);
    }

    #[test]
    fn backoff_survives_absurd_failure_counts() {
        let mut policy = ReconnectPolicy::new();
        for _ in 0..100 {
            let _ = policy.next_delay_ms();
        }
        // Shifts past 63 bits must cap, not overflow.
        assert_eq!(policy.next_delay_ms(), BACKOFF_CAP_MS);
    }

    #[test]
    fn poll_budget_yields_initial_delay_then_intervals() {
        let mut budget = PollBudget::new(5, 1_500, 1_000);
        let mut waits = Vec::new();
        while let Some(wait) = budget.next_wait_ms() {
            waits.push(wait);
        }
        assert_eq!(waits, vec![1_000, 1_500, 1_500, 1_500, 1_500]);
        assert!(budget.is_exhausted());
        assert_eq!(budget.next_wait_ms(), None);
    }

    #[test]
    fn empty_budget_is_exhausted_immediately() {
        let mut budget = PollBudget::new(0, 1_500, 1_000);
        assert!(budget.is_exhausted());
        assert_eq!(budget.next_wait_ms(), None);
    }
}
