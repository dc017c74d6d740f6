//! Batch upload module for parallel execution of async operations.
//!
//! The processor bounds in-flight concurrency with a semaphore, retries
//! transient failures with exponential backoff, and accounts for every
//! submitted item exactly once in the final report.

pub mod error;
pub mod processor;
pub mod progress;
pub mod types;

pub use error::BatchError;
pub use processor::BatchProcessor;
pub use progress::{format_duration, BatchProgressTracker};
pub use types::{
    BatchReport, ItemError, ItemOutcome, ItemStatus, ProgressCallback, ProgressUpdate, RetryPolicy,
};
