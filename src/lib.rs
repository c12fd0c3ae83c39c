//! LRU TTL Cache - A bounded in-process cache
//!
//! Bounds memory with least-recently-used eviction while expiring entries by
//! a per-item time-to-live, both lazily on read and with a background reaper.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::CacheError;
pub use tasks::Reaper;
