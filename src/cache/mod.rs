//! Cache Module
//!
//! Provides in-memory caching with per-entry retention and
//! expiration-ordered eviction.

mod clock;
mod entry;
mod expiry;
mod stats;
mod store;


// Re-export public types
pub use clock::{ManualClock, SystemClock, TimeSource};
pub use stats::CacheStats;
pub use store::AgedCache;

// == Capacity ==
/// Bound on the number of live entries a cache may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capacity {
    /// No bound; only expiration removes entries
    #[default]
    Unbounded,
    /// At most this many live entries; overflow evicts the soonest to expire
    Bounded(usize),
}

impl Capacity {
    /// Returns the bound, if any.
    pub fn limit(self) -> Option<usize> {
        match self {
            Capacity::Unbounded => None,
            Capacity::Bounded(max) => Some(max),
        }
    }

    /// Returns true if `live` entries would break this bound.
    pub fn is_exceeded_by(self, live: usize) -> bool {
        self.limit().is_some_and(|max| live > max)
    }
}

impl From<Option<usize>> for Capacity {
    fn from(limit: Option<usize>) -> Self {
        limit.map_or(Capacity::Unbounded, Capacity::Bounded)
    }
}
