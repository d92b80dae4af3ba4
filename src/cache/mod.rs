//! In-process TTL cache.
//!
//! Entries carry an absolute expiry instant supplied by the caller, and reads
//! take the current instant as an argument, so expiry can be tested without
//! sleeping.
//!
//! # Design
//!
//! - Backed by a `DashMap`: readers and writers only contend per shard
//! - Expired entries are dropped lazily on read
//! - Concurrent writers for the same key: last writer wins

use std::hash::Hash;
use std::time::Instant;

use dashmap::DashMap;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// A shared map whose entries expire at a fixed instant.
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, Entry<V>>,
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value for `key` if it has not expired at `now`.
    ///
    /// An entry is expired once `now >= expires_at`.
    pub fn get(&self, key: &K, now: Instant) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries
                .remove_if(key, |_, entry| now >= entry.expires_at);
        }
        None
    }

    /// Store `value` until `expires_at`, replacing any previous entry.
    pub fn put(&self, key: K, value: V, expires_at: Instant) {
        self.entries.insert(key, Entry { value, expires_at });
    }

    /// Drop the entry for `key`.
    pub fn invalidate(&self, key: &K) {
        self.entries.remove(key);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
