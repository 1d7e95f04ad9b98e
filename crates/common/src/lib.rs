//! Shared utilities, configuration, and error handling for CarePoint
//!
//! This crate provides common functionality used across the CarePoint application:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Request extractors

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::{Config, StoreBackend};
pub use db::{is_unique_violation, RepositoryError};
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
