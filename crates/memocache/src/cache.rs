//! MemoCache: LRU cache wrapping a pure function

use std::fmt::Debug;
use std::hash::Hash;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::Result;
use crate::lru::LruCache;
use crate::stats::CacheStats;

/// Memoizing cache in front of a deterministic function
///
/// The lock guards only the recency list and index. It is released while
/// the wrapped function runs, so concurrent misses on the same key each
/// invoke the function; the later insert refreshes the earlier one.
pub struct MemoCache<K, V, F> {
    /// Wrapped function, invoked on every miss
    function: F,

    /// Recency list and key index
    cache: Mutex<LruCache<K, V>>,

    /// Cache statistics
    stats: CacheStats,

    /// Cache capacity
    capacity: usize,
}

/// Cache over a `u64 -> u64` function
pub type U64Cache<F> = MemoCache<u64, u64, F>;

impl<K, V, F> MemoCache<K, V, F>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
    F: Fn(K) -> V,
{
    /// Create a new MemoCache with the given capacity
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of results retained; 0 disables retention
    /// * `function` - Function whose results are cached
    pub fn new(capacity: usize, function: F) -> Self {
        debug!(capacity, "creating memo cache");

        Self {
            function,
            cache: Mutex::new(LruCache::new(capacity)),
            stats: CacheStats::new(),
            capacity,
        }
    }

    /// Return the function's value for `key`, computing it on a miss
    ///
    /// A hit marks the entry most recently used and never invokes the
    /// function. A miss invokes it without holding the lock, then inserts
    /// the result, evicting the least recently used entry if full. A panic
    /// in the function propagates to the caller and leaves the cache as it
    /// was before the call.
    pub fn call(&self, key: K) -> V {
        let cached = self.cache.lock().get(&key).cloned();
        if let Some(value) = cached {
            trace!(?key, "cache hit");
            self.stats.record_hit();
            return value;
        }

        trace!(?key, "cache miss");
        self.stats.record_miss();
        let value = (self.function)(key.clone());

        if self.capacity == 0 {
            return value;
        }

        let mut cache = self.cache.lock();
        let refreshed = cache.contains(&key);
        let evicted = cache.insert(key.clone(), value.clone());
        drop(cache);

        if refreshed {
            trace!(?key, "entry already inserted by a concurrent miss");
            return value;
        }

        if let Some((evicted_key, _)) = evicted {
            debug!(key = ?evicted_key, "evicted least recently used entry");
            self.stats.record_eviction();
        }
        trace!(?key, "adding entry to cache");
        self.stats.record_insert();

        value
    }

    /// Check whether `key` is cached, without touching recency order
    pub fn contains(&self, key: &K) -> bool {
        self.cache.lock().contains(key)
    }

    /// Most recently used key
    pub fn front_key(&self) -> Option<K> {
        self.cache.lock().front().cloned()
    }

    /// Snapshot of cached keys, most recently used first
    pub fn keys(&self) -> Vec<K> {
        self.cache.lock().keys().cloned().collect()
    }

    /// Drop a single cached result
    ///
    /// # Returns
    /// * `bool` - Whether the key was cached
    pub fn invalidate(&self, key: &K) -> bool {
        self.cache.lock().remove(key).is_some()
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get current cache size
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every cached result (statistics are kept)
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Verify that the index and the recency list agree
    pub fn check_invariants(&self) -> Result<()> {
        self.cache.lock().check_invariants()
    }
}
