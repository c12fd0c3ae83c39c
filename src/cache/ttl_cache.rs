//! TTL Cache Module
//!
//! The public cache: an [`EntryStore`] behind a single lock, with capacity
//! bounded by LRU eviction and entries expired by per-item TTL, both lazily on
//! read and proactively by a background [`Reaper`].

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use crate::cache::{CacheEntry, CacheStats, EntryStore};
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{ExpirySweep, Reaper};

// == Locked State ==
/// Everything guarded by the cache lock.
#[derive(Debug)]
struct State<K, V> {
    store: EntryStore<K, V>,
    stats: CacheStats,
}

impl<K, V> State<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn insert(&mut self, key: K, entry: CacheEntry<V>, capacity: usize) {
        // Overwrites keep their slot; only new keys compete for capacity
        if !self.store.contains_key(&key) && self.store.len() >= capacity {
            if self.store.pop_oldest().is_some() {
                self.stats.record_eviction();
                trace!(capacity, "evicted least recently used entry");
            }
        }

        self.store.put(key, entry);
        self.sync_total();
    }

    fn lookup<Q>(&mut self, key: &Q, now: Instant) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let expired = match self.store.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.store.remove(key);
            self.stats.record_miss();
            self.stats.record_expirations(1);
            self.sync_total();
            trace!("dropped expired entry on read");
            return None;
        }

        self.store.touch(key);
        self.stats.record_hit();
        self.store.get(key).map(|entry| entry.value.clone())
    }

    fn take<Q>(&mut self, key: &Q, now: Instant) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.store.remove(key)?;
        self.sync_total();

        if entry.is_expired(now) {
            self.stats.record_expirations(1);
            return None;
        }
        Some(entry.value)
    }

    fn purge(&mut self, now: Instant) -> usize {
        let removed = self.store.remove_expired(now);
        self.stats.record_expirations(removed);
        self.sync_total();
        removed
    }

    fn sync_total(&mut self) {
        self.stats.set_total_entries(self.store.len());
    }
}

// == Shared Core ==
/// State shared between the cache handle and its reaper.
struct Shared<K, V> {
    state: Mutex<State<K, V>>,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl<K, V> Shared<K, V> {
    /// Acquires the cache lock.
    ///
    /// A panic while the lock was held poisons it; every mutation keeps the
    /// map and recency list consistent step by step, so the guard is reused.
    fn lock(&self) -> MutexGuard<'_, State<K, V>> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("cache lock poisoned by a panicking holder, recovering");
            poisoned.into_inner()
        })
    }
}

impl<K, V> ExpirySweep for Shared<K, V>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    fn sweep_expired(&self) -> usize {
        let mut state = self.lock();
        state.purge(self.clock.now())
    }
}

// == Cache ==
/// Thread-safe, capacity-bounded cache with LRU eviction and per-entry TTL.
///
/// Built once by its owner and shared by reference (typically `Arc<Cache>`).
/// Construction starts a background reaper on the current tokio runtime;
/// the reaper is cancelled when the cache is dropped, or cancelled and joined
/// by [`Cache::shutdown`].
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use lru_ttl_cache::Cache;
///
/// # #[tokio::main]
/// # async fn main() -> lru_ttl_cache::error::Result<()> {
/// let cache = Cache::new(3)?;
/// cache.set("user:1", "Alice", Duration::from_secs(5))?;
/// assert_eq!(cache.get("user:1"), Some("Alice"));
/// cache.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct Cache<K, V> {
    shared: Arc<Shared<K, V>>,
    reaper: Reaper,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    // == Constructors ==
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// Uses the system clock and the default reaper interval.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::from_config(&CacheConfig::default().with_capacity(capacity))
    }

    /// Creates a cache from configuration, using the system clock.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    ///
    /// # Errors
    /// - [`CacheError::InvalidCapacity`] / [`CacheError::InvalidReapInterval`]
    ///   if the configuration is rejected
    /// - [`CacheError::NoRuntime`] when called outside a tokio runtime
    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let runtime =
            Handle::try_current().map_err(|err| CacheError::NoRuntime(err.to_string()))?;

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                store: EntryStore::new(),
                stats: CacheStats::new(),
            }),
            capacity: config.capacity,
            clock,
        });
        let reaper = Reaper::spawn(Arc::clone(&shared), config.reap_interval, &runtime);

        debug!(
            capacity = config.capacity,
            reap_interval = ?config.reap_interval,
            "cache created"
        );
        Ok(Self { shared, reaper })
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`.
    ///
    /// Overwriting an existing key replaces its value, restarts its TTL from
    /// now and makes it most recently used without changing the size. A new
    /// key inserted at capacity first evicts the least recently used entry.
    ///
    /// # Errors
    /// - [`CacheError::InvalidTtl`] if `ttl` is zero
    /// - [`CacheError::TtlOverflow`] if the deadline cannot be represented
    pub fn set(&self, key: K, value: V, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl(ttl));
        }

        let mut state = self.shared.lock();
        let now = self.shared.clock.now();
        let expires_at = now
            .checked_add(ttl)
            .ok_or(CacheError::TtlOverflow(ttl))?;

        state.insert(key, CacheEntry::new(value, now, expires_at), self.shared.capacity);
        Ok(())
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired.
    ///
    /// A hit makes the key most recently used. An expired entry is removed on
    /// the spot and reported as a miss.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.shared.lock();
        state.lookup(key, self.shared.clock.now())
    }

    // == Size ==
    /// Returns the number of stored entries.
    ///
    /// This may include expired entries that neither a read nor a reaper
    /// pass has removed yet.
    pub fn size(&self) -> usize {
        self.shared.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    // == Remove ==
    /// Deletes `key`, returning its value if it had not expired yet.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.shared.lock();
        state.take(key, self.shared.clock.now())
    }

    /// Remaining TTL for a live key. Does not count as a use.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let state = self.shared.lock();
        let now = self.shared.clock.now();
        state
            .store
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.ttl_remaining(now))
    }

    // == Purge Expired ==
    /// Runs a reaper pass synchronously and returns the number of removed entries.
    pub fn purge_expired(&self) -> usize {
        self.shared.sweep_expired()
    }

    /// Removes every entry. Counters are kept.
    pub fn clear(&self) {
        let mut state = self.shared.lock();
        state.store.clear();
        state.sync_total();
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.shared.lock().stats.clone()
    }

    /// Returns true while the background reaper is alive.
    pub fn is_reaper_running(&self) -> bool {
        self.reaper.is_running()
    }

    // == Shutdown ==
    /// Stops the reaper and waits for it to exit, then drops the cache.
    pub async fn shutdown(self) {
        self.reaper.stop().await;
        debug!("cache shut down");
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("capacity", &self.shared.capacity)
            .field("size", &self.shared.lock().store.len())
            .field("clock", &self.shared.clock)
            .finish_non_exhaustive()
    }
}
