//! Aged Cache - an in-memory key/value cache with per-entry retention
//!
//! Every entry is stored with its own retention and is purged lazily once
//! expired. An optional capacity bound evicts the entry closest to expiring.

pub mod cache;
pub mod config;
pub mod error;
pub mod shared;

pub use cache::{AgedCache, CacheStats, Capacity, ManualClock, SystemClock, TimeSource};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use shared::SharedCache;
