//! Shared Cache Module
//!
//! Wraps an `AgedCache` behind one async mutex so it can be used from many
//! tasks. Every operation takes the same lock; the cache itself is never
//! touched concurrently.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::cache::{AgedCache, CacheStats, SystemClock, TimeSource};
use crate::config::CacheConfig;
use crate::error::Result;

/// Cloneable handle to a cache guarded by a single mutex.
///
/// A mutex rather than a read/write lock: lookups sweep expired entries and
/// therefore need exclusive access too.
#[derive(Debug)]
pub struct SharedCache<K, V, C = SystemClock> {
    inner: Arc<Mutex<AgedCache<K, V, C>>>,
}

impl<K, V, C> Clone for SharedCache<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    /// Creates a shared wall-clock cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(AgedCache::from_config(config))
    }
}

impl<K, V, C> SharedCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: TimeSource,
{
    /// Wraps an existing cache.
    pub fn new(cache: AgedCache<K, V, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Locks the cache for a multi-step critical section.
    pub async fn lock(&self) -> MutexGuard<'_, AgedCache<K, V, C>> {
        self.inner.lock().await
    }

    /// See [`AgedCache::put`].
    pub async fn put(&self, key: K, value: V, retention_ms: i64) -> Result<()> {
        self.inner.lock().await.put(key, value, retention_ms)
    }

    /// See [`AgedCache::get`]; the value is cloned out of the lock.
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().await.get(key).cloned()
    }

    /// See [`AgedCache::remove`].
    pub async fn remove<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().await.remove(key)
    }

    /// See [`AgedCache::size`].
    pub async fn size(&self) -> usize {
        self.inner.lock().await.size()
    }

    /// See [`AgedCache::is_empty`].
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// See [`AgedCache::stats`].
    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }
}
