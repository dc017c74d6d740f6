//! Core batch processor for parallel execution.

use crate::batch::error::BatchError;
use crate::batch::types::{
    BatchReport, ItemError, ItemOutcome, ItemStatus, ProgressCallback, ProgressUpdate, RetryPolicy,
};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Generic batch processor for parallel execution of async operations.
///
/// Runs items concurrently with a hard cap on simultaneous handler
/// invocations, retries transient failures with exponential backoff, and
/// returns one outcome per submitted item. Holds no global state; safe to
/// construct per batch run.
pub struct BatchProcessor<T, R> {
    /// Maximum number of concurrent handler invocations.
    concurrency: usize,
    /// Retry policy for transient failures.
    retry_policy: RetryPolicy,
    /// Admission gate bounding in-flight attempts.
    semaphore: Arc<Semaphore>,
    /// Phantom data to hold type parameters.
    _phantom: PhantomData<(T, R)>,
}

impl<T, R> BatchProcessor<T, R>
where
    T: Send + Clone + Debug + 'static,
    R: Send + 'static,
{
    /// Create a new batch processor.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidConfig`] if `concurrency` is zero.
    pub fn new(concurrency: usize, retry_policy: RetryPolicy) -> Result<Self, BatchError> {
        if concurrency == 0 {
            return Err(BatchError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            concurrency,
            retry_policy,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            _phantom: PhantomData,
        })
    }

    /// Run a batch of items through `handler`.
    ///
    /// Every submitted item yields exactly one outcome in the report, in
    /// submission order. Individual failures are data in the report, never
    /// an error from this call. An empty `items` returns an empty report.
    ///
    /// Cancelling `cancel` stops admission of new items and abandons
    /// backoff waits; attempts already in flight finish and their results
    /// are recorded. Items that never reach a terminal state are reported
    /// as [`ItemStatus::Cancelled`].
    pub async fn run<F, Fut>(
        &self,
        items: Vec<T>,
        handler: F,
        progress: Option<ProgressCallback>,
        cancel: CancellationToken,
    ) -> BatchReport<T, R>
    where
        F: Fn(T) -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = Result<R, ItemError>> + Send + 'static,
    {
        let start = Instant::now();
        let total = items.len();

        if total == 0 {
            return BatchReport::new(vec![], start.elapsed());
        }

        debug!(
            total_items = total,
            concurrency = self.concurrency,
            max_retries = self.retry_policy.max_retries,
            "Starting batch run"
        );

        let completed = Arc::new(AtomicUsize::new(0));
        let active = Arc::new(AtomicUsize::new(0));
        let succeeded = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let cancelled_count = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(total);
        // Retained so a panicked task still yields an outcome for its item.
        let mut submitted = Vec::with_capacity(total);

        for (index, item) in items.into_iter().enumerate() {
            submitted.push(item.clone());

            let handler = handler.clone();
            let semaphore = Arc::clone(&self.semaphore);
            let retry_policy = self.retry_policy.clone();
            let cancel = cancel.clone();
            let progress = progress.clone();
            let completed = Arc::clone(&completed);
            let active = Arc::clone(&active);
            let succeeded = Arc::clone(&succeeded);
            let failed = Arc::clone(&failed);
            let cancelled_count = Arc::clone(&cancelled_count);

            let handle = tokio::spawn(async move {
                let outcome = Self::run_item(
                    index,
                    item,
                    handler,
                    semaphore,
                    retry_policy,
                    cancel,
                    Arc::clone(&active),
                )
                .await;

                match outcome.status {
                    ItemStatus::Succeeded(_) => succeeded.fetch_add(1, Ordering::SeqCst),
                    ItemStatus::Failed(_) => failed.fetch_add(1, Ordering::SeqCst),
                    ItemStatus::Cancelled => cancelled_count.fetch_add(1, Ordering::SeqCst),
                };
                let completed_now = completed.fetch_add(1, Ordering::SeqCst) + 1;

                if let Some(cb) = &progress {
                    cb(ProgressUpdate {
                        index: outcome.index,
                        completed: completed_now,
                        active: active.load(Ordering::SeqCst),
                        succeeded: succeeded.load(Ordering::SeqCst),
                        failed: failed.load(Ordering::SeqCst),
                        cancelled: cancelled_count.load(Ordering::SeqCst),
                        total,
                    });
                }

                outcome
            });

            handles.push(handle);
        }

        let mut outcomes = Vec::with_capacity(total);
        for (index, (handle, item)) in handles.into_iter().zip(submitted).enumerate() {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    // The handler panicked; the item still gets an outcome.
                    error!(index, "Batch task failed: {}", e);
                    outcomes.push(ItemOutcome {
                        index,
                        item,
                        attempts: 0,
                        status: ItemStatus::Failed(format!("task panicked: {}", e)),
                    });
                }
            }
        }

        let report = BatchReport::new(outcomes, start.elapsed());

        debug!(
            total_items = report.total(),
            succeeded = report.succeeded,
            failed = report.failed,
            cancelled = report.cancelled,
            duration_ms = report.elapsed.as_millis(),
            "Batch run completed"
        );

        report
    }

    /// Drive one item to a terminal state.
    ///
    /// The admission permit is held only for the duration of a single
    /// attempt and released before any backoff sleep, so the gate can admit
    /// other items while this one waits.
    async fn run_item<F, Fut>(
        index: usize,
        item: T,
        handler: F,
        semaphore: Arc<Semaphore>,
        retry_policy: RetryPolicy,
        cancel: CancellationToken,
        active: Arc<AtomicUsize>,
    ) -> ItemOutcome<T, R>
    where
        F: Fn(T) -> Fut + Send + Sync,
        Fut: std::future::Future<Output = Result<R, ItemError>> + Send,
    {
        let mut attempts = 0u32;

        loop {
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(index, attempts, "Item cancelled before admission");
                    return ItemOutcome { index, item, attempts, status: ItemStatus::Cancelled };
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(p) => p,
                    // The semaphore outlives the run and is never closed.
                    Err(_) => {
                        return ItemOutcome {
                            index,
                            item,
                            attempts,
                            status: ItemStatus::Failed("admission gate closed".to_string()),
                        };
                    }
                },
            };

            let guard = ActiveGuard::new(&active);
            attempts += 1;
            let result = handler(item.clone()).await;
            drop(guard);
            drop(permit);

            match result {
                Ok(payload) => {
                    return ItemOutcome {
                        index,
                        item,
                        attempts,
                        status: ItemStatus::Succeeded(payload),
                    };
                }
                Err(ItemError::Permanent { message }) => {
                    warn!(index, attempts, "Item failed permanently: {}", message);
                    return ItemOutcome { index, item, attempts, status: ItemStatus::Failed(message) };
                }
                Err(ItemError::Transient { message, retry_after }) => {
                    if attempts > retry_policy.max_retries {
                        warn!(index, attempts, "Item failed, retries exhausted: {}", message);
                        return ItemOutcome {
                            index,
                            item,
                            attempts,
                            status: ItemStatus::Failed(message),
                        };
                    }

                    // A server-provided hint overrides the computed backoff.
                    let delay = retry_after.unwrap_or_else(|| retry_policy.delay_for(attempts - 1));
                    debug!(
                        index,
                        attempt = attempts,
                        delay_ms = delay.as_millis(),
                        "Retrying after backoff: {}",
                        message
                    );

                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => {
                            debug!(index, attempts, "Item cancelled during backoff");
                            return ItemOutcome { index, item, attempts, status: ItemStatus::Cancelled };
                        }
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}

/// Holds the active-attempt count for the span of one handler invocation.
///
/// Decrements on drop, so a panicking handler unwinds the counter instead
/// of inflating `active` for the rest of the run.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl<'a> ActiveGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
