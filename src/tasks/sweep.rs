//! TTL Sweep Task
//!
//! Background task that periodically reclaims expired cache entries and
//! publishes their payloads to the notification queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::Shared;

/// Spawns the sweep loop for a cache.
///
/// The first pass runs one full `interval` after the call, then once per
/// `interval`. The loop ends when `true` is sent on `shutdown_rx` or when the
/// sender is dropped along with its cache.
///
/// # Returns
/// A JoinHandle for the spawned task so the owner can await its exit.
pub(crate) fn spawn_sweep_task(
    runtime: &Handle,
    shared: Arc<Shared>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    // Anchor the schedule at spawn time, not at the task's first poll
    let first_sweep = Instant::now() + interval;

    runtime.spawn(async move {
        debug!(
            "Starting TTL sweep task with interval of {} ms",
            interval.as_millis()
        );

        let mut ticker = tokio::time::interval_at(first_sweep, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = shared.sweep().await;

                    if outcome.dropped > 0 {
                        warn!(
                            "TTL sweep: notification queue full, dropped {} oldest notifications",
                            outcome.dropped
                        );
                    }

                    if outcome.reclaimed > 0 {
                        info!("TTL sweep: reclaimed {} expired entries", outcome.reclaimed);
                    } else {
                        debug!("TTL sweep: no expired entries found");
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("TTL sweep task exiting");
    })
}
