//! Bounded cluster refresh schedule.
//!
//! After a clustering configuration change the backend recomputes
//! asynchronously and sends no completion signal, so the client polls a
//! fixed number of times and then stops, whether or not fresh data
//! arrived. The schedule itself lives in
//! [`seismon_core::retry::PollBudget`]; this module drives it.

use std::time::Duration;

use seismon_core::retry::PollBudget;

/// Run every attempt in `budget`, sleeping the scheduled wait before
/// each one.
///
/// `attempt` reports whether it picked up fresh data; the result only
/// feeds the log line and never cuts the schedule short. Returns how
/// many attempts reported success.
pub async fn run_budget<F, Fut>(mut budget: PollBudget, mut attempt: F) -> u32
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let mut succeeded = 0_u32;
    while let Some(wait_ms) = budget.next_wait_ms() {
        tokio::time::sleep(Duration::from_millis(wait_ms)).await;
        if attempt().await {
            succeeded = succeeded.saturating_add(1);
        } else {
            tracing::debug!(
                remaining = budget.attempts_remaining(),
                "cluster refresh attempt returned no update"
            );
        }
    }
    tracing::debug!(succeeded, "cluster refresh schedule exhausted");
    succeeded
}
