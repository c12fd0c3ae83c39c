//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a cache.
//!
//! # Tasks
//! - TTL Reaper: Removes expired cache entries at configured intervals

mod reaper;

pub use reaper::{ExpirySweep, Reaper};
