//! Cache Entry Module
//!
//! Defines individual cache entries and how their expiration is computed.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{CacheError, Result};

// == Cache Entry ==
/// A single stored entry plus its links within its key chain.
///
/// Only the links change after construction.
#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    /// The key this entry was stored under
    pub key: K,
    /// The stored value
    pub value: V,
    /// First instant at which the entry is no longer live
    pub expires_at: DateTime<Utc>,
    /// Insertion sequence number, used to break expiration ties
    pub seq: u64,
    /// Arena index of the previous (newer) entry with the same key
    pub prev: Option<usize>,
    /// Arena index of the next (older) entry with the same key
    pub next: Option<usize>,
}

impl<K, V> Entry<K, V> {
    // == Constructor ==
    /// Creates an unlinked entry.
    pub fn new(key: K, value: V, expires_at: DateTime<Utc>, seq: u64) -> Self {
        Self {
            key,
            value,
            expires_at,
            seq,
            prev: None,
            next: None,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: the entry is expired once `now` reaches
    /// `expires_at`; it is live only while `expires_at` is strictly after `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    // == Remaining ==
    /// Returns the remaining lifetime at `now`, or zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        if self.is_expired(now) {
            TimeDelta::zero()
        } else {
            self.expires_at - now
        }
    }
}

// == Utility Functions ==
/// Computes `now + retention_ms`.
///
/// # Errors
/// `InvalidArgument` if the retention is negative or the resulting instant
/// is out of range.
pub(crate) fn expiration_for(now: DateTime<Utc>, retention_ms: i64) -> Result<DateTime<Utc>> {
    if retention_ms < 0 {
        return Err(CacheError::InvalidArgument(format!(
            "retention of {}ms is negative",
            retention_ms
        )));
    }

    TimeDelta::try_milliseconds(retention_ms)
        .and_then(|retention| now.checked_add_signed(retention))
        .ok_or_else(|| {
            CacheError::InvalidArgument(format!(
                "retention of {}ms overflows the expiration instant",
                retention_ms
            ))
        })
}
