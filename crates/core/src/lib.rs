//! Core types and configuration for the sales-insight system.
//!
//! This crate provides shared types used across all other crates:
//! - Raw and normalized sale records
//! - Configuration structures
//! - Common error types
//! - Logging setup

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
