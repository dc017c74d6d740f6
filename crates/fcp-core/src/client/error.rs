//! FCP client error types.

use crate::batch::ItemError;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by the FCP server client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Unable to connect to the FCP server.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Authentication failed (401/403).
    #[error("Authentication error (HTTP {status})")]
    Auth {
        /// HTTP status code.
        status: u16,
    },

    /// Rate limited (429).
    #[error("Rate limited{}", .retry_after.map_or_else(String::new, |d| format!(" (retry after {}s)", d.as_secs())))]
    RateLimited {
        /// Server-provided wait hint from the Retry-After header.
        retry_after: Option<Duration>,
    },

    /// FCP server returned a 5xx error.
    #[error("Server error (HTTP {status})")]
    Server {
        /// HTTP status code.
        status: u16,
    },

    /// Unexpected HTTP error status.
    #[error("Unexpected HTTP status {status}: {message}")]
    Unexpected {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// Response exceeds the maximum allowed size.
    #[error("Response too large: {size} bytes exceeds limit of {max} bytes")]
    ResponseTooLarge {
        /// Actual response size in bytes.
        size: usize,
        /// Configured limit in bytes.
        max: usize,
    },

    /// Response body could not be parsed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Whether this failure is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout(_) | Self::Server { .. } | Self::RateLimited { .. }
        )
    }

    /// Server-provided retry hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Classification boundary between the HTTP client and the batch executor.
impl From<ClientError> for ItemError {
    fn from(err: ClientError) -> Self {
        if err.is_transient() {
            ItemError::Transient { retry_after: err.retry_after(), message: err.to_string() }
        } else {
            ItemError::Permanent { message: err.to_string() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::Connection("refused".to_string()).is_transient());
        assert!(ClientError::Timeout("30s elapsed".to_string()).is_transient());
        assert!(ClientError::Server { status: 503 }.is_transient());
        assert!(ClientError::RateLimited { retry_after: None }.is_transient());
    }

    #[test]
    fn test_permanent_classification() {
        assert!(!ClientError::NotFound("/meals".to_string()).is_transient());
        assert!(!ClientError::Auth { status: 401 }.is_transient());
        assert!(!ClientError::InvalidResponse("not json".to_string()).is_transient());
        assert!(!ClientError::ResponseTooLarge { size: 1, max: 1 }.is_transient());
    }

    #[test]
    fn test_rate_limit_carries_retry_after_into_item_error() {
        let err = ClientError::RateLimited { retry_after: Some(Duration::from_secs(12)) };
        let item_err: ItemError = err.into();
        match item_err {
            ItemError::Transient { retry_after, .. } => {
                assert_eq!(retry_after, Some(Duration::from_secs(12)));
            }
            ItemError::Permanent { .. } => panic!("expected transient"),
        }
    }

    #[test]
    fn test_auth_error_maps_to_permanent() {
        let item_err: ItemError = ClientError::Auth { status: 403 }.into();
        assert!(!item_err.is_transient());
        assert!(item_err.message().contains("403"));
    }

    #[test]
    fn test_display_messages() {
        let err = ClientError::RateLimited { retry_after: Some(Duration::from_secs(5)) };
        assert_eq!(format!("{}", err), "Rate limited (retry after 5s)");
        let err = ClientError::RateLimited { retry_after: None };
        assert_eq!(format!("{}", err), "Rate limited");
        let err = ClientError::ResponseTooLarge { size: 11, max: 10 };
        assert_eq!(format!("{}", err), "Response too large: 11 bytes exceeds limit of 10 bytes");
    }
}
