//! Cache Module
//!
//! Provides the in-memory TTL cache, its items, and the queue that reports
//! reclaimed payloads.

mod item;
mod notify;
mod stats;
mod store;


// Re-export public types
pub(crate) use item::Item;
pub use notify::NotificationQueue;
pub use stats::CacheStats;
pub use store::{Cache, SweepOutcome};
pub(crate) use store::Shared;

// == Public Constants ==
/// Lower bound on the sweep interval so a zero TTL does not spin
pub const MIN_SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);
