//! Configuration Module
//!
//! Handles building and loading cache configuration, either programmatically
//! or from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default TTL applied when none is configured
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Largest accepted TTL (100 years), keeping `now + ttl` within `Instant`'s range
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Default bound of the reclaimed-items notification queue
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 10;

/// Cache configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Idle time after which an untouched entry is stale
    pub ttl: Duration,
    /// Maximum number of reclaimed payloads held for consumers
    pub notification_capacity: usize,
}

impl CacheConfig {
    /// Creates a configuration with the given TTL and the default queue capacity.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
        }
    }

    /// Sets the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the notification queue capacity.
    pub fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = capacity;
        self
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_SECS` - TTL in seconds (default: 300)
    /// - `NOTIFICATION_CAPACITY` - Notification queue bound (default: 10)
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            ttl: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TTL),
            notification_capacity: env::var("NOTIFICATION_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_NOTIFICATION_CAPACITY),
        }
    }

    /// Checks that the configuration can back a cache.
    pub fn validate(&self) -> Result<()> {
        if self.ttl > MAX_TTL {
            return Err(CacheError::InvalidConfig(format!(
                "ttl must not exceed {} seconds",
                MAX_TTL.as_secs()
            )));
        }
        if self.notification_capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "notification capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
