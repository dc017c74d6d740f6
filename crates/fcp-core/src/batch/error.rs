//! Error types for batch execution.

use thiserror::Error;

/// Errors that abort a batch run before any item executes.
///
/// Per-item failures are never surfaced here; they are recorded in the
/// report so a partially failed batch still returns normally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Invalid executor configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let err = BatchError::InvalidConfig("concurrency must be at least 1".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid configuration"));
        assert!(msg.contains("concurrency must be at least 1"));
    }
}
