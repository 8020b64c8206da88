//! Cache Store Module
//!
//! Main cache engine: an arena of entries chained per key, an expiration
//! index for sweeping and eviction, and an optional capacity bound.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, trace, warn};

use crate::cache::entry::{expiration_for, Entry};
use crate::cache::expiry::{ExpiryIndex, ExpiryKey};
use crate::cache::{CacheStats, Capacity, SystemClock, TimeSource};
use crate::config::{CacheConfig, DEFAULT_RETENTION_MS};
use crate::error::Result;

// == Aged Cache ==
/// In-memory key/value cache where every entry carries its own retention.
///
/// Expired entries are purged lazily by the next operation; nothing runs in
/// the background. Storing a key twice keeps both entries: lookups return
/// the most recently inserted live one and `size` counts both.
///
/// # Example
/// ```
/// use aged_cache::{AgedCache, Capacity, ManualClock};
///
/// let clock = ManualClock::new();
/// let mut cache = AgedCache::with_clock(clock.clone(), Capacity::Unbounded);
///
/// cache.put("a", 1, 50).unwrap();
/// clock.advance_ms(10);
/// assert_eq!(cache.get("a"), Some(&1));
///
/// clock.advance_ms(50);
/// assert_eq!(cache.get("a"), None);
/// assert!(cache.is_empty());
/// ```
#[derive(Debug)]
pub struct AgedCache<K, V, C = SystemClock> {
    /// Entry arena; `None` marks a released slot
    slots: Vec<Option<Entry<K, V>>>,
    /// Released slot indices available for reuse
    free: Vec<usize>,
    /// Head of each key's chain (most recent entry first)
    heads: HashMap<K, usize>,
    /// Expiration order of every stored entry
    expiry: ExpiryIndex,
    /// Number of stored entries
    live: usize,
    /// Next insertion sequence number
    next_seq: u64,
    capacity: Capacity,
    /// Retention used by `put_default`
    default_retention_ms: i64,
    stats: CacheStats,
    clock: C,
}

impl<K, V> AgedCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    // == Constructors ==
    /// Creates a cache on the wall clock.
    pub fn new(capacity: Capacity) -> Self {
        Self::with_clock(SystemClock, capacity)
    }

    /// Creates a wall-clock cache from loaded configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity).with_default_retention(config.default_retention_ms)
    }
}

impl<K, V, C> AgedCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: TimeSource,
{
    /// Creates a cache reading time from `clock`.
    ///
    /// # Arguments
    /// * `clock` - Source of the current instant
    /// * `capacity` - Live entry bound, or `Capacity::Unbounded`
    pub fn with_clock(clock: C, capacity: Capacity) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            heads: HashMap::new(),
            expiry: ExpiryIndex::new(),
            live: 0,
            next_seq: 0,
            capacity,
            default_retention_ms: DEFAULT_RETENTION_MS,
            stats: CacheStats::new(),
            clock,
        }
    }

    /// Sets the retention used by `put_default`.
    pub fn with_default_retention(mut self, retention_ms: i64) -> Self {
        self.default_retention_ms = retention_ms;
        self
    }

    // == Put ==
    /// Stores `value` under `key` for `retention_ms` milliseconds.
    ///
    /// Older entries for the same key are kept but shadowed. If the live
    /// count then exceeds the capacity bound, the entry expiring soonest
    /// (possibly this one) is evicted; ties go to the earliest insertion.
    /// A zero retention is accepted but the entry is expired on arrival and
    /// never stored.
    ///
    /// # Errors
    /// `InvalidArgument` if `retention_ms` is negative or overflows the
    /// expiration instant. Nothing is stored in that case.
    pub fn put(&mut self, key: K, value: V, retention_ms: i64) -> Result<()> {
        let now = self.clock.now();
        let expires_at = match expiration_for(now, retention_ms) {
            Ok(expires_at) => expires_at,
            Err(err) => {
                warn!("Rejected insertion: {}", err);
                return Err(err);
            }
        };

        self.sweep(now);

        if expires_at <= now {
            trace!("Dropping entry with zero retention");
            return Ok(());
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        let older = self.heads.get(&key).copied();
        let mut entry = Entry::new(key.clone(), value, expires_at, seq);
        entry.next = older;
        let slot = self.allocate(entry);
        if let Some(older) = older.and_then(|index| self.slots.get_mut(index)) {
            if let Some(older) = older.as_mut() {
                older.prev = Some(slot);
            }
        }

        self.heads.insert(key, slot);
        self.expiry.track(ExpiryKey::new(expires_at, seq, slot));
        self.live += 1;

        if self.capacity.is_exceeded_by(self.live) {
            self.evict_soonest();
        }

        Ok(())
    }

    /// Stores `value` under `key` using the default retention.
    pub fn put_default(&mut self, key: K, value: V) -> Result<()> {
        self.put(key, value, self.default_retention_ms)
    }

    // == Get ==
    /// Returns the value of the most recently inserted live entry for `key`.
    ///
    /// Sweeps expired entries first, so an expired entry is never returned.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        self.sweep(now);

        // After the sweep every chained entry is live, so the head wins
        let found = self.heads.get(key).copied();
        match found {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }

        found
            .and_then(|slot| self.slots.get(slot))
            .and_then(Option::as_ref)
            .map(|entry| &entry.value)
    }

    // == Time To Live ==
    /// Returns the remaining lifetime of the entry `get` would return.
    pub fn time_to_live<Q>(&mut self, key: &Q) -> Option<TimeDelta>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        self.sweep(now);

        self.heads
            .get(key)
            .and_then(|&slot| self.slots.get(slot))
            .and_then(Option::as_ref)
            .map(|entry| entry.remaining(now))
    }

    // == Remove ==
    /// Removes every live entry stored under `key`.
    ///
    /// Returns the number of entries removed.
    pub fn remove<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        self.sweep(now);

        let mut removed = 0;
        let mut cursor = self.heads.remove(key);
        while let Some(slot) = cursor {
            let Some(entry) = self.slots.get_mut(slot).and_then(Option::take) else {
                break;
            };
            self.expiry
                .forget(&ExpiryKey::new(entry.expires_at, entry.seq, slot));
            self.free.push(slot);
            self.live -= 1;
            removed += 1;
            cursor = entry.next;
        }

        removed
    }

    // == Size ==
    /// Returns the number of live entries, counting duplicate keys separately.
    pub fn size(&mut self) -> usize {
        let now = self.clock.now();
        self.sweep(now);
        debug_assert_eq!(self.expiry.len(), self.live);
        self.live
    }

    // == Is Empty ==
    /// Returns true if no live entries remain.
    pub fn is_empty(&mut self) -> bool {
        self.size() == 0
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now();
        self.sweep(now)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&mut self) -> CacheStats {
        let now = self.clock.now();
        self.sweep(now);
        let mut stats = self.stats.clone();
        stats.set_live_entries(self.live);
        stats
    }

    /// Returns the configured capacity bound.
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    // == Internals ==
    /// Places `entry` in a free slot, growing the arena if none is free.
    fn allocate(&mut self, entry: Entry<K, V>) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(entry);
                slot
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        }
    }

    /// Removes every entry expired at `now`. Returns how many were removed.
    fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        while let Some(expired) = self.expiry.pop_expired(now) {
            if self.unlink(expired.slot).is_some() {
                removed += 1;
            }
        }

        if removed > 0 {
            self.stats.record_expirations(removed);
            trace!(removed, live = self.live, "Swept expired entries");
        }
        removed
    }

    /// Evicts the live entry with the smallest expiration.
    fn evict_soonest(&mut self) {
        let Some(victim) = self.expiry.pop_soonest() else {
            return;
        };
        if self.unlink(victim.slot).is_some() {
            self.stats.record_eviction();
            debug!(
                expires_at = %victim.expires_at,
                live = self.live,
                capacity = ?self.capacity,
                "Evicted entry to honour capacity"
            );
        }
    }

    /// Detaches the entry at `slot` from its key chain and releases the slot.
    ///
    /// Constant time: only the two neighbours are patched. The caller is
    /// responsible for the expiry index.
    fn unlink(&mut self, slot: usize) -> Option<Entry<K, V>> {
        let entry = self.slots.get_mut(slot)?.take()?;

        match entry.prev {
            Some(prev) => {
                if let Some(newer) = self.slots.get_mut(prev).and_then(Option::as_mut) {
                    newer.next = entry.next;
                }
            }
            None => match entry.next {
                Some(next) => {
                    if let Some(head) = self.heads.get_mut(&entry.key) {
                        *head = next;
                    }
                }
                None => {
                    self.heads.remove(&entry.key);
                }
            },
        }
        if let Some(next) = entry.next {
            if let Some(older) = self.slots.get_mut(next).and_then(Option::as_mut) {
                older.prev = entry.prev;
            }
        }

        self.free.push(slot);
        self.live -= 1;
        Some(entry)
    }
}
