//! Data types for batch execution.

use std::sync::Arc;
use std::time::Duration;

/// Classified failure returned by a batch handler.
///
/// The classification decides retry behavior: transient failures (network,
/// timeout, server busy, rate limit) are retried per the [`RetryPolicy`];
/// permanent failures (validation, unreadable input) are not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// Recoverable failure; the item will be retried while attempts remain.
    Transient {
        /// Human-readable failure description.
        message: String,
        /// Server-specified wait before the next attempt. Overrides the
        /// computed exponential backoff for that wait when present.
        retry_after: Option<Duration>,
    },
    /// Unrecoverable failure; the item is never retried.
    Permanent {
        /// Human-readable failure description.
        message: String,
    },
}

impl ItemError {
    /// Create a transient error.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient { message: message.into(), retry_after: None }
    }

    /// Create a transient error carrying a server-provided retry hint.
    pub fn transient_with_retry_after(message: impl Into<String>, retry_after: Duration) -> Self {
        Self::Transient { message: message.into(), retry_after: Some(retry_after) }
    }

    /// Create a permanent error.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Permanent { message: message.into() }
    }

    /// Whether this failure should be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// The failure description.
    pub fn message(&self) -> &str {
        match self {
            Self::Transient { message, .. } | Self::Permanent { message } => message,
        }
    }
}

impl std::fmt::Display for ItemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transient { message, .. } => write!(f, "transient: {}", message),
            Self::Permanent { message } => write!(f, "permanent: {}", message),
        }
    }
}

impl std::error::Error for ItemError {}

/// Terminal state of one batch item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus<R> {
    /// The handler completed successfully.
    Succeeded(R),
    /// The handler failed permanently or exhausted its retries.
    Failed(String),
    /// The batch was cancelled before this item reached a terminal state.
    Cancelled,
}

/// Outcome for a single submitted item.
///
/// The submission index together with the embedded item map the outcome
/// unambiguously back to its input; completion order carries no meaning.
#[derive(Debug, Clone)]
pub struct ItemOutcome<T, R> {
    /// Submission index of the originating item.
    pub index: usize,
    /// The originating item.
    pub item: T,
    /// Number of handler attempts made (0 if cancelled before starting).
    pub attempts: u32,
    /// Terminal status.
    pub status: ItemStatus<R>,
}

impl<T, R> ItemOutcome<T, R> {
    /// Whether this item succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.status, ItemStatus::Succeeded(_))
    }
}

/// Aggregate result of a batch run.
///
/// Contains exactly one [`ItemOutcome`] per submitted item, in submission
/// order, plus summary counters. Owned by the caller; not persisted.
#[derive(Debug, Clone)]
pub struct BatchReport<T, R> {
    /// Per-item outcomes, indexed by submission order.
    pub outcomes: Vec<ItemOutcome<T, R>>,
    /// Number of items that succeeded.
    pub succeeded: usize,
    /// Number of items that failed permanently or exhausted retries.
    pub failed: usize,
    /// Number of items cancelled before completion.
    pub cancelled: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl<T, R> BatchReport<T, R> {
    /// Build a report from per-item outcomes.
    pub fn new(outcomes: Vec<ItemOutcome<T, R>>, elapsed: Duration) -> Self {
        let mut succeeded = 0;
        let mut failed = 0;
        let mut cancelled = 0;
        for outcome in &outcomes {
            match outcome.status {
                ItemStatus::Succeeded(_) => succeeded += 1,
                ItemStatus::Failed(_) => failed += 1,
                ItemStatus::Cancelled => cancelled += 1,
            }
        }
        Self { outcomes, succeeded, failed, cancelled, elapsed }
    }

    /// Total number of items in the batch.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Success rate as a percentage (0.0 to 100.0).
    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            (self.succeeded as f64 / self.outcomes.len() as f64) * 100.0
        }
    }

    /// Whether every item succeeded.
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0 && self.cancelled == 0
    }

    /// Iterate over outcomes that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome<T, R>> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Retry policy for transient item failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the computed delay.
    pub max_delay: Duration,
    /// Backoff multiplier (e.g., 2.0 for exponential backoff).
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy.
    pub fn new(
        max_retries: u32,
        initial_delay: Duration,
        max_delay: Duration,
        multiplier: f64,
    ) -> Self {
        Self { max_retries, initial_delay, max_delay, multiplier }
    }

    /// Delay before the retry following `retry_count` completed retries.
    ///
    /// Exponential backoff: `initial_delay * multiplier^retry_count`, capped
    /// at `max_delay`.
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        let delay_ms = (self.initial_delay.as_millis() as f64
            * self.multiplier.powi(retry_count as i32))
        .min(self.max_delay.as_millis() as f64) as u64;
        Duration::from_millis(delay_ms)
    }
}

/// Snapshot passed to the progress callback on each item completion.
#[derive(Debug, Clone, Copy)]
pub struct ProgressUpdate {
    /// Submission index of the item that just completed.
    pub index: usize,
    /// Items that reached a terminal state so far.
    pub completed: usize,
    /// Handler invocations currently in flight.
    pub active: usize,
    /// Successful items so far.
    pub succeeded: usize,
    /// Failed items so far.
    pub failed: usize,
    /// Cancelled items so far.
    pub cancelled: usize,
    /// Total items in the batch.
    pub total: usize,
}

/// Progress callback, invoked at most once per item on terminal completion.
///
/// Must not block; it runs on the executor's task.
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_delay_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1), Duration::from_secs(60), 2.0);
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    }

    #[test]
    fn test_retry_policy_delay_capped() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(5), 2.0);
        assert_eq!(policy.delay_for(8), Duration::from_secs(5));
    }

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(1));
        assert_eq!(policy.multiplier, 2.0);
    }

    #[test]
    fn test_item_error_classification() {
        assert!(ItemError::transient("connection reset").is_transient());
        assert!(!ItemError::permanent("unsupported file extension").is_transient());
        assert_eq!(ItemError::transient("busy").message(), "busy");
    }

    #[test]
    fn test_item_error_retry_after_hint() {
        let err = ItemError::transient_with_retry_after("rate limited", Duration::from_secs(7));
        match err {
            ItemError::Transient { retry_after, .. } => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
            }
            ItemError::Permanent { .. } => panic!("expected transient"),
        }
    }

    #[test]
    fn test_batch_report_counters() {
        let outcomes: Vec<ItemOutcome<&str, ()>> = vec![
            ItemOutcome { index: 0, item: "a", attempts: 1, status: ItemStatus::Succeeded(()) },
            ItemOutcome {
                index: 1,
                item: "b",
                attempts: 2,
                status: ItemStatus::Failed("boom".to_string()),
            },
            ItemOutcome { index: 2, item: "c", attempts: 0, status: ItemStatus::Cancelled },
        ];
        let report = BatchReport::new(outcomes, Duration::from_secs(1));
        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.cancelled, 1);
        assert!(!report.is_complete_success());
        assert_eq!(report.failures().count(), 2);
        assert!((report.success_rate() - 33.333).abs() < 0.01);
    }

    #[test]
    fn test_batch_report_empty() {
        let report: BatchReport<(), ()> = BatchReport::new(vec![], Duration::ZERO);
        assert_eq!(report.total(), 0);
        assert!(report.is_complete_success());
        assert!((report.success_rate() - 0.0).abs() < f64::EPSILON);
    }
}
