//! Time Source Module
//!
//! Abstracts "current instant" so the cache can run on the wall clock in
//! production and on a hand-advanced clock in tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

// == Time Source ==
/// Capability supplying the current instant.
pub trait TimeSource {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// == System Clock ==
/// Wall-clock time source backed by `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// == Manual Clock ==
/// Deterministic time source that only moves when told to.
///
/// Clones share the same underlying time, so a test can hand one clone to
/// the cache and keep another to advance it.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: DateTime<Utc>,
    elapsed_ms: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a clock frozen at the Unix epoch.
    pub fn new() -> Self {
        Self::starting_at(DateTime::<Utc>::default())
    }

    /// Creates a clock frozen at `origin`.
    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            elapsed_ms: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Moves the clock forward by `by` (millisecond precision).
    ///
    /// Negative deltas are ignored; the clock never runs backwards.
    pub fn advance(&self, by: TimeDelta) {
        if let Ok(ms) = u64::try_from(by.num_milliseconds()) {
            self.advance_ms(ms);
        }
    }

    /// Moves the clock forward by `ms` milliseconds, saturating at the
    /// largest representable offset.
    pub fn advance_ms(&self, ms: u64) {
        let step = i64::try_from(ms).unwrap_or(i64::MAX);
        let _ = self
            .elapsed_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |elapsed| {
                Some(elapsed.saturating_add(step))
            });
    }

    /// Milliseconds elapsed since the clock's origin.
    pub fn elapsed_ms(&self) -> i64 {
        self.elapsed_ms.load(Ordering::SeqCst)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        TimeDelta::try_milliseconds(self.elapsed_ms())
            .and_then(|elapsed| self.origin.checked_add_signed(elapsed))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
