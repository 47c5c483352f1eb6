//! Cache Store Module
//!
//! Main cache engine: a HashMap of items behind one RwLock, a sliding TTL,
//! and an owned background sweep that reclaims stale entries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::cache::{CacheStats, Item, NotificationQueue, MIN_SWEEP_INTERVAL};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweep_task;

// == Sweep Outcome ==
/// What a single sweep pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Entries removed from the map and published
    pub reclaimed: usize,
    /// Older notifications discarded to make room
    pub dropped: usize,
}

/// Map contents and counters, guarded together so stats move with the data.
#[derive(Debug, Default)]
struct State {
    items: HashMap<String, Item>,
    stats: CacheStats,
}

/// State shared between the cache handle and its sweep task.
#[derive(Debug)]
pub(crate) struct Shared {
    state: RwLock<State>,
    ttl: Duration,
    finished: NotificationQueue,
}

impl Shared {
    pub(crate) fn new(ttl: Duration, notification_capacity: usize) -> Self {
        Self {
            state: RwLock::new(State::default()),
            ttl,
            finished: NotificationQueue::new(notification_capacity),
        }
    }

    // == Sweep ==
    /// Removes every expired entry and publishes its payload.
    ///
    /// The scan, the removals and the publications all happen under a single
    /// hold of the write lock.
    pub(crate) async fn sweep(&self) -> SweepOutcome {
        let mut state = self.state.write().await;
        let now = Instant::now();

        let expired_keys: Vec<String> = state
            .items
            .iter()
            .filter(|(_, item)| item.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let mut outcome = SweepOutcome::default();
        for key in expired_keys {
            if let Some(item) = state.items.remove(&key) {
                outcome.reclaimed += 1;
                if self.finished.push(item.into_data()).is_some() {
                    outcome.dropped += 1;
                }
            }
        }

        state.stats.record_sweep(outcome.reclaimed, outcome.dropped);
        outcome
    }
}

// == Cache ==
/// In-memory key/value cache whose entries expire after a period of disuse.
///
/// Every successful [`Cache::get`] and every [`Cache::set`] pushes the entry's
/// expiry out to `now + ttl`. A background task sweeps the map once per
/// [`Cache::sweep_interval`], removing stale entries and publishing their
/// payloads to [`Cache::finished_items`].
///
/// The sweep task lives exactly as long as the cache: it stops on
/// [`Cache::shutdown`] or when the cache is dropped. Share a cache between
/// tasks by wrapping it in an `Arc`.
///
/// # Example
/// ```rust,no_run
/// use std::time::Duration;
/// use ttl_cache::Cache;
///
/// #[tokio::main]
/// async fn main() {
///     let cache = Cache::new(Duration::from_secs(30));
///     cache.set("session", "alice").await;
///     assert_eq!(cache.get("session").await.as_deref(), Some("alice"));
/// }
/// ```
#[derive(Debug)]
pub struct Cache {
    shared: Arc<Shared>,
    sweep_interval: Duration,
    /// Dropping the sender also ends the sweep task
    shutdown_tx: watch::Sender<bool>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl Cache {
    // == Constructor ==
    /// Creates a cache with the given TTL and a notification queue of 10.
    ///
    /// A zero TTL is accepted; entries then go stale as soon as the clock moves.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime, which is needed to spawn
    /// the sweep task, or if `ttl` exceeds [`MAX_TTL`](crate::config::MAX_TTL).
    /// Use [`Cache::with_config`] to get an error instead.
    pub fn new(ttl: Duration) -> Self {
        match Self::with_config(CacheConfig::new(ttl)) {
            Ok(cache) => cache,
            Err(err) => panic!("ttl_cache::Cache::new failed: {}", err),
        }
    }

    /// Creates a cache from a full configuration.
    ///
    /// # Errors
    /// - [`CacheError::InvalidConfig`] if the notification capacity is zero
    ///   or the TTL exceeds [`MAX_TTL`](crate::config::MAX_TTL)
    /// - [`CacheError::NoRuntime`] if no Tokio runtime is running
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

        let shared = Arc::new(Shared::new(config.ttl, config.notification_capacity));
        let sweep_interval = config.ttl.max(MIN_SWEEP_INTERVAL);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = spawn_sweep_task(&runtime, Arc::clone(&shared), sweep_interval, shutdown_rx);

        info!(
            ttl_ms = config.ttl.as_millis() as u64,
            sweep_interval_ms = sweep_interval.as_millis() as u64,
            notification_capacity = config.notification_capacity,
            "TTL cache created"
        );

        Ok(Self {
            shared,
            sweep_interval,
            shutdown_tx,
            sweeper: Mutex::new(Some(handle)),
        })
    }

    // == Set ==
    /// Stores `value` under `key`, resetting its expiry to `now + ttl`.
    ///
    /// An existing payload is replaced silently; only the sweep publishes.
    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        let mut state = self.shared.state.write().await;
        state.items.insert(key, Item::new(value, self.shared.ttl));
    }

    // == Get ==
    /// Looks up `key`, extending its life on a hit.
    ///
    /// Returns `None` for keys that were never set, were deleted, or have
    /// expired. A stale entry is left in place for the sweep to reclaim.
    pub async fn get(&self, key: &str) -> Option<String> {
        // Write lock: a hit moves the expiry horizon
        let mut state = self.shared.state.write().await;
        let state = &mut *state;

        match state.items.get_mut(key) {
            Some(item) if !item.is_expired() => {
                item.touch(self.shared.ttl);
                state.stats.record_hit();
                Some(item.data().to_string())
            }
            _ => {
                state.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes `key` if present.
    pub async fn delete(&self, key: &str) {
        let mut state = self.shared.state.write().await;
        state.items.remove(key);
    }

    // == Count ==
    /// Returns the number of entries, including stale ones not yet swept.
    pub async fn count(&self) -> usize {
        self.shared.state.read().await.items.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.count().await == 0
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub async fn stats(&self) -> CacheStats {
        let state = self.shared.state.read().await;
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.items.len());
        stats
    }

    // == Finished Items ==
    /// Consumer end of the queue of payloads reclaimed by the sweep.
    pub fn finished_items(&self) -> &NotificationQueue {
        &self.shared.finished
    }

    /// Runs one sweep pass immediately on the calling task.
    pub async fn sweep_now(&self) -> SweepOutcome {
        self.shared.sweep().await
    }

    /// Returns the fixed TTL.
    pub fn ttl(&self) -> Duration {
        self.shared.ttl
    }

    /// Returns the period of the background sweep.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    // == Shutdown ==
    /// Stops the background sweep and waits for it to finish.
    ///
    /// Calling this more than once is harmless. The cache stays usable, but
    /// nothing reclaims stale entries afterwards except [`Cache::sweep_now`].
    pub async fn shutdown(&self) {
        // Receiver may already be gone if the task ended; nothing to signal then
        let _ = self.shutdown_tx.send(true);

        let handle = self
            .sweeper
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!("Sweep task ended abnormally: {}", err);
            }
            info!("TTL cache sweep stopped");
        }
    }

    /// Returns true once the background sweep is no longer running.
    pub fn is_sweeper_finished(&self) -> bool {
        self.sweeper
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, sleep};

    const TTL: Duration = Duration::from_secs(1);

    /// Cache whose background sweep is already stopped, so only `sweep_now` reclaims.
    async fn manual_cache(config: CacheConfig) -> Cache {
        let cache = Cache::with_config(config).unwrap();
        cache.shutdown().await;
        cache
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_new() {
        let cache = Cache::new(TTL);
        assert_eq!(cache.count().await, 0);
        assert!(cache.is_empty().await);
        assert_eq!(cache.ttl(), TTL);
        assert_eq!(cache.finished_items().capacity(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_and_get() {
        let cache = Cache::new(TTL);

        cache.set("key1", "value1").await;

        assert_eq!(cache.get("key1").await.as_deref(), Some("value1"));
        assert_eq!(cache.count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_nonexistent() {
        let cache = Cache::new(TTL);
        assert!(cache.get("nonexistent").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_keeps_one_entry() {
        let cache = Cache::new(TTL);

        cache.set("key1", "value1").await;
        cache.set("key1", "value2").await;

        assert_eq!(cache.get("key1").await.as_deref(), Some("value2"));
        assert_eq!(cache.count().await, 1);
        assert!(
            cache.finished_items().is_empty(),
            "Overwrite must not publish the old payload"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete() {
        let cache = Cache::new(TTL);

        cache.set("key1", "value1").await;
        cache.delete("key1").await;

        assert!(cache.is_empty().await);
        assert!(cache.get("key1").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_nonexistent_is_noop() {
        let cache = Cache::new(TTL);
        cache.set("key1", "value1").await;

        cache.delete("missing").await;

        assert_eq!(cache.count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_after_expiry_does_not_remove() {
        let cache = manual_cache(CacheConfig::new(Duration::from_secs(10))).await;
        cache.set("key1", "value1").await;

        advance(Duration::from_millis(10_001)).await;

        assert!(cache.get("key1").await.is_none());
        assert_eq!(cache.count().await, 1, "Only the sweep removes entries");
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_extends_lifetime() {
        let cache = Cache::new(Duration::from_secs(10));
        cache.set("key1", "value1").await;

        advance(Duration::from_secs(6)).await;
        assert!(cache.get("key1").await.is_some());

        // Past the original horizon but inside the refreshed one
        advance(Duration::from_secs(6)).await;
        assert_eq!(cache.get("key1").await.as_deref(), Some("value1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_refreshes_existing_key() {
        let cache = Cache::new(Duration::from_secs(10));
        cache.set("key1", "value1").await;

        advance(Duration::from_secs(8)).await;
        cache.set("key1", "value2").await;

        advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get("key1").await.as_deref(), Some("value2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_now_publishes_expired() {
        let cache = manual_cache(CacheConfig::new(Duration::from_secs(10))).await;
        cache.set("stale", "old").await;
        advance(Duration::from_secs(5)).await;
        cache.set("fresh", "new").await;

        advance(Duration::from_millis(5_500)).await;
        let outcome = cache.sweep_now().await;

        assert_eq!(outcome, SweepOutcome { reclaimed: 1, dropped: 0 });
        assert_eq!(cache.count().await, 1);
        assert_eq!(cache.finished_items().drain(), vec!["old".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_now_drops_oldest_when_full() {
        let config = CacheConfig::new(Duration::from_secs(10)).with_notification_capacity(2);
        let cache = manual_cache(config).await;

        cache.set("a", "1").await;
        advance(Duration::from_secs(11)).await;
        assert_eq!(cache.sweep_now().await.reclaimed, 1);

        cache.set("b", "2").await;
        cache.set("c", "3").await;
        advance(Duration::from_secs(11)).await;
        let outcome = cache.sweep_now().await;

        assert_eq!(outcome, SweepOutcome { reclaimed: 2, dropped: 1 });
        let mut remaining = cache.finished_items().drain();
        remaining.sort();
        assert_eq!(remaining, vec!["2".to_string(), "3".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_track_activity() {
        let cache = Cache::new(TTL);
        cache.set("key1", "value1").await;

        cache.get("key1").await;
        cache.get("missing").await;
        advance(Duration::from_millis(1_100)).await;
        cache.get("key1").await;
        cache.sweep_now().await;

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert!(stats.sweeps >= 1);
        assert_eq!(stats.reclaimed, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_floors_sweep_interval() {
        let cache = Cache::new(Duration::ZERO);
        assert_eq!(cache.sweep_interval(), MIN_SWEEP_INTERVAL);

        let slow = Cache::new(Duration::from_secs(5));
        assert_eq!(slow.sweep_interval(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweep_reclaims() {
        let cache = Cache::new(TTL);
        cache.set("key1", "value1").await;

        // Ticks at 1s (not yet stale) and 2s (stale)
        sleep(Duration::from_millis(2_100)).await;

        assert_eq!(cache.count().await, 0);
        assert_eq!(cache.finished_items().try_recv().as_deref(), Some("value1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_sweep() {
        let cache = Cache::new(TTL);
        assert!(!cache.is_sweeper_finished());

        cache.shutdown().await;
        assert!(cache.is_sweeper_finished());

        cache.set("key1", "value1").await;
        sleep(Duration::from_secs(5)).await;
        assert_eq!(cache.count().await, 1, "No sweep should run after shutdown");

        // Second call is a no-op
        cache.shutdown().await;
    }

    #[test]
    fn test_with_config_without_runtime() {
        let result = Cache::with_config(CacheConfig::new(TTL));
        assert!(matches!(result, Err(CacheError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_with_config_rejects_unrepresentable_ttl() {
        let config = CacheConfig::new(Duration::from_secs(u64::MAX));
        assert!(matches!(
            Cache::with_config(config),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_ttl_cache_works() {
        let cache = Cache::with_config(CacheConfig::new(crate::config::MAX_TTL)).unwrap();
        cache.set("key1", "value1").await;

        advance(Duration::from_secs(3600)).await;

        assert_eq!(cache.get("key1").await.as_deref(), Some("value1"));
        assert_eq!(cache.sweep_interval(), crate::config::MAX_TTL);
    }

    #[tokio::test]
    async fn test_with_config_rejects_zero_capacity() {
        let config = CacheConfig::new(TTL).with_notification_capacity(0);
        assert!(matches!(
            Cache::with_config(config),
            Err(CacheError::InvalidConfig(_))
        ));
    }
}
