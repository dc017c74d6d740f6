//! Command implementations for the FCP CLI.

pub mod health;
pub mod log;
