//! TTL Cache demo daemon
//!
//! Runs a cache configured from the environment, logs every payload the
//! sweep reclaims, and shuts down cleanly on Ctrl+C or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::{Cache, CacheConfig};

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache, which starts its sweep task
/// 4. Spawn a consumer draining the reclaimed-items queue
/// 5. Seed a few entries so the sweep has something to reclaim
/// 6. Wait for SIGINT/SIGTERM, then report stats and stop the sweep
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TTL cache demo");

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: ttl={}s, notification_capacity={}",
        config.ttl.as_secs(),
        config.notification_capacity
    );

    let cache = Arc::new(Cache::with_config(config).context("failed to build cache")?);

    let consumer = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            loop {
                let payload = cache.finished_items().recv().await;
                info!(payload = %payload, "Entry reclaimed");
            }
        })
    };

    for (key, value) in [("alpha", "1"), ("beta", "2"), ("gamma", "3")] {
        cache.set(key, value).await;
    }
    info!("Seeded {} entries", cache.count().await);

    shutdown_signal().await;

    let stats = cache.stats().await;
    info!(
        "Final stats: {}",
        serde_json::to_string(&stats).context("failed to serialize stats")?
    );

    cache.shutdown().await;
    consumer.abort();
    info!("Consumer task aborted");

    info!("Demo shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
