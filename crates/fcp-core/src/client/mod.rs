//! HTTP client for the FCP server.
//!
//! The client handles connection pooling, request-level retry with backoff,
//! and classification of HTTP failures into [`ClientError`]. The batch
//! executor consumes that classification through
//! `ItemError::from(ClientError)`.

pub mod core;
pub mod error;
pub mod meals;

pub use core::FcpClient;
pub use error::ClientError;
pub use meals::{CreateFoodLogRequest, FoodLog};
