//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Cache misses are not
//! errors; only caller contract violations surface here.

use std::time::Duration;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must allow at least one entry
    #[error("Invalid capacity: {0} (must be greater than zero)")]
    InvalidCapacity(usize),

    /// TTL must be a positive duration
    #[error("Invalid TTL: {0:?} (must be greater than zero)")]
    InvalidTtl(Duration),

    /// TTL too large to be turned into a deadline
    #[error("TTL overflow: {0:?} cannot be represented as a deadline")]
    TtlOverflow(Duration),

    /// Reaper interval must be a positive duration
    #[error("Invalid reap interval: {0:?} (must be greater than zero)")]
    InvalidReapInterval(Duration),

    /// The cache was built outside of a tokio runtime
    #[error("No async runtime available: {0}")]
    NoRuntime(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CacheError::InvalidCapacity(0).to_string(),
            "Invalid capacity: 0 (must be greater than zero)"
        );
        assert_eq!(
            CacheError::InvalidTtl(Duration::ZERO).to_string(),
            "Invalid TTL: 0ns (must be greater than zero)"
        );
        assert!(CacheError::NoRuntime("no reactor".to_string())
            .to_string()
            .contains("no reactor"));
    }
}
