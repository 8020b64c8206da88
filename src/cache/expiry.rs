//! Expiry Index Module
//!
//! Orders stored entries by expiration for sweeping and eviction.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

// == Expiry Key ==
/// Position of one stored entry in expiration order.
///
/// Field order defines the ordering: soonest expiration first, then
/// earliest insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct ExpiryKey {
    pub expires_at: DateTime<Utc>,
    pub seq: u64,
    pub slot: usize,
}

impl ExpiryKey {
    pub fn new(expires_at: DateTime<Utc>, seq: u64, slot: usize) -> Self {
        Self {
            expires_at,
            seq,
            slot,
        }
    }
}

// == Expiry Index ==
/// Tracks expiration order for sweep and eviction.
///
/// The first key is always the entry that will expire soonest.
#[derive(Debug, Default)]
pub(crate) struct ExpiryIndex {
    order: BTreeSet<ExpiryKey>,
}

impl ExpiryIndex {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self {
            order: BTreeSet::new(),
        }
    }

    // == Track ==
    /// Starts tracking an entry.
    pub fn track(&mut self, key: ExpiryKey) {
        self.order.insert(key);
    }

    // == Forget ==
    /// Stops tracking an entry. Returns false if it was not tracked.
    pub fn forget(&mut self, key: &ExpiryKey) -> bool {
        self.order.remove(key)
    }

    // == Pop Expired ==
    /// Removes and returns the soonest entry if it has expired at `now`.
    pub fn pop_expired(&mut self, now: DateTime<Utc>) -> Option<ExpiryKey> {
        let expired = self
            .order
            .first()
            .is_some_and(|soonest| soonest.expires_at <= now);
        if expired {
            self.order.pop_first()
        } else {
            None
        }
    }

    // == Pop Soonest ==
    /// Removes and returns the entry that expires soonest.
    ///
    /// Returns None if the index is empty.
    pub fn pop_soonest(&mut self) -> Option<ExpiryKey> {
        self.order.pop_first()
    }

    // == Peek Soonest ==
    #[cfg(test)]
    pub fn peek_soonest(&self) -> Option<&ExpiryKey> {
        self.order.first()
    }

    // == Length ==
    /// Returns the number of tracked entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::default() + TimeDelta::milliseconds(ms)
    }

    #[test]
    fn test_expiry_new() {
        let index = ExpiryIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_soonest_is_smallest_expiration() {
        let mut index = ExpiryIndex::new();

        index.track(ExpiryKey::new(at(100), 0, 0));
        index.track(ExpiryKey::new(at(50), 1, 1));
        index.track(ExpiryKey::new(at(200), 2, 2));

        assert_eq!(index.len(), 3);
        assert_eq!(index.peek_soonest().map(|k| k.slot), Some(1));
    }

    #[test]
    fn test_ties_go_to_earliest_insertion() {
        let mut index = ExpiryIndex::new();

        index.track(ExpiryKey::new(at(100), 5, 9));
        index.track(ExpiryKey::new(at(100), 3, 4));
        index.track(ExpiryKey::new(at(100), 8, 1));

        assert_eq!(index.pop_soonest().map(|k| k.seq), Some(3));
        assert_eq!(index.pop_soonest().map(|k| k.seq), Some(5));
        assert_eq!(index.pop_soonest().map(|k| k.seq), Some(8));
        assert_eq!(index.pop_soonest(), None);
    }

    #[test]
    fn test_pop_expired_stops_at_live_entries() {
        let mut index = ExpiryIndex::new();

        index.track(ExpiryKey::new(at(10), 0, 0));
        index.track(ExpiryKey::new(at(20), 1, 1));
        index.track(ExpiryKey::new(at(30), 2, 2));

        // Expiration equal to now counts as expired
        assert_eq!(index.pop_expired(at(20)).map(|k| k.slot), Some(0));
        assert_eq!(index.pop_expired(at(20)).map(|k| k.slot), Some(1));
        assert_eq!(index.pop_expired(at(20)), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_pop_expired_empty() {
        let mut index = ExpiryIndex::new();
        assert_eq!(index.pop_expired(at(1_000)), None);
    }

    #[test]
    fn test_forget() {
        let mut index = ExpiryIndex::new();
        let key = ExpiryKey::new(at(10), 0, 0);

        index.track(key);
        index.track(ExpiryKey::new(at(20), 1, 1));

        assert!(index.forget(&key));
        assert!(!index.forget(&key));
        assert_eq!(index.peek_soonest().map(|k| k.slot), Some(1));
    }
}
