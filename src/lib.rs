//! TTL Cache - A self-cleaning in-memory key/value store
//!
//! Entries live for a fixed TTL after their last touch. A background sweep
//! reclaims stale entries and reports their payloads through a bounded
//! notification queue.

pub mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{Cache, CacheStats, NotificationQueue};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
