//! Error types for the TTL cache
//!
//! Cache operations themselves are total; only construction can fail.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised while building a cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No Tokio runtime to host the sweep task
    #[error("No Tokio runtime available to spawn the sweep task")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
