//! Error types for FCP Core.

use crate::batch::BatchError;
use crate::client::ClientError;
use crate::images::ImageError;
use thiserror::Error;

/// Core error type for FCP operations.
#[derive(Error, Debug)]
pub enum FcpError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server client errors
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// Image validation errors
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// Batch execution errors
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),
}

/// Result type alias for FCP operations.
pub type Result<T> = std::result::Result<T, FcpError>;
