//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;
mod ttl_cache;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruList;
pub use stats::CacheStats;
pub use store::EntryStore;
pub use ttl_cache::Cache;
