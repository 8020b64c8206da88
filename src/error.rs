//! Error types for the aged cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the aged cache.
///
/// Lookups of absent or expired keys are not errors; they yield `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Caller supplied an argument the cache cannot honour (e.g. negative retention)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

// == Result Type Alias ==
/// Convenience Result type for the aged cache.
pub type Result<T> = std::result::Result<T, CacheError>;
