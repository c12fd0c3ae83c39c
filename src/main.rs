//! LRU TTL Cache demo
//!
//! Walks a capacity-3 cache through hits, a miss, an LRU eviction and a TTL
//! expiry, then prints the final counters as JSON.

use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_ttl_cache::{Cache, CacheConfig};

/// Main entry point for the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load reaper configuration from environment variables
/// 3. Fill a capacity-3 cache and read from it
/// 4. Insert a fourth key to trigger an LRU eviction
/// 5. Wait for a short TTL to elapse
/// 6. Print stats and shut the reaper down
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_ttl_cache=info,lru_ttl_cache_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env().with_capacity(3);
    info!(
        "Configuration loaded: capacity={}, reap_interval={}ms",
        config.capacity,
        config.reap_interval.as_millis()
    );

    let cache: Cache<&str, &str> = Cache::from_config(&config)?;

    cache.set("user:1", "Alice", Duration::from_secs(5))?;
    cache.set("user:2", "Bob", Duration::from_secs(2))?;
    cache.set("user:3", "Charlie", Duration::from_secs(5))?;
    info!("set 3 entries, cache size: {}", cache.size());

    report(&cache, "user:1");
    report(&cache, "user:2");
    report(&cache, "user:99");

    info!("adding user:4 (should evict LRU)...");
    cache.set("user:4", "Diana", Duration::from_secs(5))?;
    info!("cache size: {}", cache.size());

    // user:3 is the least recently used: user:1 and user:2 were read after it
    report(&cache, "user:3");

    info!("waiting 3s for user:2 TTL to expire...");
    tokio::time::sleep(Duration::from_secs(3)).await;
    report(&cache, "user:2");

    info!("final cache size: {}", cache.size());
    println!("{}", serde_json::to_string_pretty(&cache.stats())?);

    cache.shutdown().await;
    info!("demo done");
    Ok(())
}

fn report(cache: &Cache<&'static str, &'static str>, key: &'static str) {
    match cache.get(key) {
        Some(value) => info!("GET {} -> {} (hit)", key, value),
        None => info!("GET {} -> (miss)", key),
    }
}
