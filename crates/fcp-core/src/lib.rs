//! FCP Core - Client library for the FCP food-data server.
//!
//! This crate provides the core functionality for the `fcp` CLI, including:
//! - Bounded-concurrency batch executor with retry and backoff
//! - HTTP client for the FCP server with error classification
//! - Image validation and resolution selection
//! - Configuration loading
//!
//! # Example
//!
//! ```rust,no_run
//! use fcp_core::{config::Config, client::FcpClient};
//!
//! #[tokio::main]
//! async fn main() -> fcp_core::error::Result<()> {
//!     let config = Config::load()?;
//!     let client = FcpClient::new(&config)?;
//!     client.health_check().await?;
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod images;

pub use batch::{
    BatchError, BatchProcessor, BatchProgressTracker, BatchReport, ItemError, ItemOutcome,
    ItemStatus, RetryPolicy,
};
pub use client::{ClientError, CreateFoodLogRequest, FcpClient, FoodLog};
pub use config::Config;
pub use error::{FcpError, Result};
pub use images::{auto_select_resolution, read_image_as_base64, ImageError, Resolution};
