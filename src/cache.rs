//! Time-bounded memoization of loaded result sets.
//!
//! A [`QueryCache`] is keyed by the arguments a loader was called with and
//! serves the stored result until its time-to-live runs out. Caches are plain
//! values owned by whoever runs the passes and handed to the query objects,
//! so nothing is shared between passes unless the owner shares the cache.
//!
//! There is no single-flight: two callers missing the same key both load and
//! the later insert overwrites the earlier one.

use log::debug;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Memoizes values per key for a fixed time-to-live.
pub struct QueryCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
    hits: u64,
    misses: u64,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// Create an empty cache whose entries expire `ttl` after insertion.
    ///
    /// A zero TTL disables caching: every lookup misses.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key` if it is still fresh.
    ///
    /// Expired entries are dropped on lookup.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = Instant::now();
        let fresh = match self.entries.get(key) {
            Some(entry) => now.duration_since(entry.stored_at) < self.ttl,
            None => {
                self.misses += 1;
                return None;
            }
        };

        if fresh {
            self.hits += 1;
            self.entries.get(key).map(|e| e.value.clone())
        } else {
            debug!("cache entry expired for {:?}", key);
            self.entries.remove(key);
            self.misses += 1;
            None
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// Entries that have expired are dropped first, so the cache never holds
    /// more than the keys stored within one TTL.
    pub fn insert(&mut self, key: K, value: V) {
        self.purge_expired();
        self.entries.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Return the fresh cached value, or run `load` and cache its result.
    ///
    /// Errors from `load` are returned as-is and nothing is cached.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: &K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(key) {
            debug!("cache hit for {:?}", key);
            return Ok(value);
        }
        let value = load()?;
        self.insert(key.clone(), value.clone());
        Ok(value)
    }

    /// Drop every entry whose TTL has run out.
    pub fn purge_expired(&mut self) {
        let now = Instant::now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.stored_at) < ttl);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!("dropped {} expired cache entries", dropped);
        }
    }

    /// Drop the entry for one key.
    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, including any that expired since the last
    /// insert.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since the cache was created.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
