//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;

use tracing::info;

use crate::cache::Capacity;

/// Environment variable holding the capacity bound.
pub const CAPACITY_VAR: &str = "AGED_CACHE_CAPACITY";

/// Environment variable holding the default retention in milliseconds.
pub const DEFAULT_RETENTION_VAR: &str = "AGED_CACHE_DEFAULT_RETENTION_MS";

/// Retention used by `put_default` when nothing is configured (5 minutes).
pub const DEFAULT_RETENTION_MS: i64 = 300_000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of live entries, or unbounded
    pub capacity: Capacity,
    /// Retention in milliseconds for entries stored without an explicit one
    pub default_retention_ms: i64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `AGED_CACHE_CAPACITY` - Live entry bound; unset, empty or `unbounded` means no bound
    /// - `AGED_CACHE_DEFAULT_RETENTION_MS` - Default retention (default: 300000)
    ///
    /// Unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            capacity: env::var(CAPACITY_VAR)
                .ok()
                .map(|v| parse_capacity(&v))
                .unwrap_or_default(),
            default_retention_ms: env::var(DEFAULT_RETENTION_VAR)
                .ok()
                .and_then(|v| parse_retention(&v))
                .unwrap_or(DEFAULT_RETENTION_MS),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: Capacity::Unbounded,
            default_retention_ms: DEFAULT_RETENTION_MS,
        }
    }
}

fn parse_capacity(raw: &str) -> Capacity {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("unbounded") {
        return Capacity::Unbounded;
    }
    match raw.parse::<usize>() {
        Ok(max) => Capacity::Bounded(max),
        Err(_) => {
            info!("Ignoring unparsable {}={:?}, cache is unbounded", CAPACITY_VAR, raw);
            Capacity::Unbounded
        }
    }
}

fn parse_retention(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(ms) if ms >= 0 => Some(ms),
        _ => {
            info!(
                "Ignoring invalid {}={:?}, using {}ms",
                DEFAULT_RETENTION_VAR, raw, DEFAULT_RETENTION_MS
            );
            None
        }
    }
}
