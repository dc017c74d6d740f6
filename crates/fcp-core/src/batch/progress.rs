//! Progress tracking for batch execution.

use crate::batch::types::ProgressUpdate;
use std::time::{Duration, Instant};

/// Tracks progress of batch execution for display purposes.
///
/// Fed from the processor's progress callback; the processor itself never
/// depends on how progress is rendered.
#[derive(Debug, Clone)]
pub struct BatchProgressTracker {
    /// Total number of items to process.
    pub total: usize,
    /// Number of completed items.
    pub completed: usize,
    /// Number of currently active items.
    pub active: usize,
    /// Number of queued items (not yet started).
    pub queued: usize,
    /// Number of successful items.
    pub succeeded: usize,
    /// Number of failed items.
    pub failed: usize,
    /// Number of cancelled items.
    pub cancelled: usize,
    /// Start time of batch execution.
    pub start_time: Instant,
}

impl BatchProgressTracker {
    /// Create a new progress tracker.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            active: 0,
            queued: total,
            succeeded: 0,
            failed: 0,
            cancelled: 0,
            start_time: Instant::now(),
        }
    }

    /// Update the tracker from a completion event.
    pub fn update(&mut self, update: &ProgressUpdate) {
        self.completed = update.completed;
        self.active = update.active;
        self.queued = self.total.saturating_sub(update.completed + update.active);
        self.succeeded = update.succeeded;
        self.failed = update.failed;
        self.cancelled = update.cancelled;
    }

    /// Completion percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }

    /// Estimated time remaining, formatted like "2m 15s".
    pub fn calculate_eta(&self) -> String {
        if self.completed == 0 {
            return "calculating...".to_string();
        }

        let elapsed = self.start_time.elapsed();
        let avg = elapsed / self.completed as u32;
        let remaining = self.total.saturating_sub(self.completed);
        format_duration(avg * remaining as u32)
    }

    /// Average duration per completed item, formatted.
    pub fn average_duration(&self) -> String {
        if self.completed == 0 {
            return "0s".to_string();
        }
        format_duration(self.start_time.elapsed() / self.completed as u32)
    }
}

/// Format a duration as a human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;

    if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(completed: usize, active: usize, succeeded: usize, failed: usize) -> ProgressUpdate {
        ProgressUpdate { index: 0, completed, active, succeeded, failed, cancelled: 0, total: 10 }
    }

    #[test]
    fn test_tracker_counts() {
        let mut tracker = BatchProgressTracker::new(10);
        assert_eq!(tracker.queued, 10);

        tracker.update(&update(3, 2, 2, 1));
        assert_eq!(tracker.completed, 3);
        assert_eq!(tracker.active, 2);
        assert_eq!(tracker.queued, 5);
        assert_eq!(tracker.succeeded, 2);
        assert_eq!(tracker.failed, 1);
        assert!((tracker.percentage() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tracker_empty_batch_percentage() {
        let tracker = BatchProgressTracker::new(0);
        assert!((tracker.percentage() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_eta_before_first_completion() {
        let tracker = BatchProgressTracker::new(5);
        assert_eq!(tracker.calculate_eta(), "calculating...");
        assert_eq!(tracker.average_duration(), "0s");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0s");
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_secs(135)), "2m 15s");
    }
}
