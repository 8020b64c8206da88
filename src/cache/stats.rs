//! Cache Statistics Module
//!
//! Tracks cache metrics including hits, misses, evictions and expirations.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of lookups that found a live entry
    pub hits: u64,
    /// Number of lookups that found nothing live
    pub misses: u64,
    /// Number of live entries removed to honour the capacity bound
    pub evictions: u64,
    /// Number of entries removed by expiration sweeps
    pub expirations: u64,
    /// Live entries as of the snapshot
    pub live_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Expirations ==
    /// Adds `count` swept entries to the expiration counter.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    // == Update Entry Count ==
    /// Updates the live entries count.
    pub fn set_live_entries(&mut self, count: usize) {
        self.live_entries = count;
    }
}
