//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::time::{Duration, Instant};

use crate::error::{CacheError, Result};

/// Default maximum number of entries
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default interval between reaper passes
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(1);

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Interval between background reaper passes
    pub reap_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `CACHE_REAP_INTERVAL_MS` - Reaper frequency in milliseconds (default: 1000)
    ///
    /// Unparsable values fall back to the defaults. Zero values are kept so
    /// that [`CacheConfig::validate`] can reject them.
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
            reap_interval: env::var("CACHE_REAP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_REAP_INTERVAL),
        }
    }

    /// Returns a copy with the given capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Returns a copy with the given reaper interval.
    pub fn with_reap_interval(mut self, reap_interval: Duration) -> Self {
        self.reap_interval = reap_interval;
        self
    }

    /// Rejects configurations the cache cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidCapacity(self.capacity));
        }
        // The reaper schedules its first pass one interval from now
        let schedulable = Instant::now().checked_add(self.reap_interval).is_some();
        if self.reap_interval.is_zero() || !schedulable {
            return Err(CacheError::InvalidReapInterval(self.reap_interval));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            reap_interval: DEFAULT_REAP_INTERVAL,
        }
    }
}
