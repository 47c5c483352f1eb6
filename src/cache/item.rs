//! Cache Item Module
//!
//! Defines a single stored value and its sliding expiry horizon.

use std::time::Duration;

use tokio::time::Instant;

// == Item ==
/// A stored payload together with the instant after which it is stale.
#[derive(Debug, Clone)]
pub struct Item {
    data: String,
    expires_at: Instant,
}

impl Item {
    // == Constructor ==
    /// Creates an item that expires `ttl` from now.
    pub fn new(data: String, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    // == Touch ==
    /// Pushes the expiry horizon to `now + ttl`.
    pub fn touch(&mut self, ttl: Duration) {
        self.expires_at = Instant::now() + ttl;
    }

    // == Is Expired ==
    /// Checks if the item has expired.
    ///
    /// Expiry is strict: an item is stale only once the current time is past
    /// `expires_at`, so the instant itself still counts as live.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`Item::is_expired`] against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    /// Returns the stored payload.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Consumes the item, returning its payload.
    pub fn into_data(self) -> String {
        self.data
    }

    #[cfg(test)]
    fn expires_at(&self) -> Instant {
        self.expires_at
    }
}
