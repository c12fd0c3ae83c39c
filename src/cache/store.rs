//! Entry Store Module
//!
//! Capacity-agnostic storage combining a HashMap with LRU recency ordering.
//! Capacity and expiry policy are applied by [`crate::cache::Cache`], which
//! owns the store behind its lock.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

use crate::cache::{CacheEntry, LruList};

#[derive(Debug)]
struct Slot<V> {
    entry: CacheEntry<V>,
    /// Index of this key's node in the recency list
    node: usize,
}

// == Entry Store ==
/// Key to entry mapping with O(1) lookup, touch and evict-oldest.
#[derive(Debug)]
pub struct EntryStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, Slot<V>>,
    /// LRU access order
    lru: LruList<K>,
}

impl<K, V> EntryStore<K, V> {
    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> EntryStore<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty store preallocated for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            lru: LruList::with_capacity(capacity),
        }
    }

    // == Put ==
    /// Inserts or replaces an entry and marks it most recently used.
    ///
    /// Returns the replaced entry, if any. Replacing keeps the key's slot but
    /// resets its recency as if it had been removed and re-inserted.
    pub fn put(&mut self, key: K, entry: CacheEntry<V>) -> Option<CacheEntry<V>> {
        if let Some(slot) = self.entries.get_mut(&key) {
            self.lru.move_to_newest(slot.node);
            return Some(std::mem::replace(&mut slot.entry, entry));
        }

        let node = self.lru.push_newest(key.clone());
        self.entries.insert(key, Slot { entry, node });
        None
    }

    // == Touch ==
    /// Marks a key as most recently used without altering its entry.
    ///
    /// Returns false if the key is absent.
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.get(key) {
            Some(slot) => self.lru.move_to_newest(slot.node),
            None => false,
        }
    }

    // == Get ==
    /// Returns the entry for a key without touching recency.
    pub fn get<Q>(&self, key: &Q) -> Option<&CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|slot| &slot.entry)
    }

    /// Checks if a key is stored, expired or not.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    // == Remove ==
    /// Removes an entry if present; no-op otherwise.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.entries.remove(key)?;
        self.lru.remove(slot.node);
        Some(slot.entry)
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently used entry.
    ///
    /// Returns None if the store is empty.
    pub fn pop_oldest(&mut self) -> Option<(K, CacheEntry<V>)> {
        let key = self.lru.pop_oldest()?;
        let slot = self.entries.remove(&key)?;
        Some((key, slot.entry))
    }

    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.lru.peek_oldest()
    }

    // == Iteration ==
    /// Iterates entries from least to most recently used.
    ///
    /// The store does not synchronise anything itself; callers scanning a
    /// shared store hold the cache lock for the whole iteration.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &CacheEntry<V>)> + '_ {
        self.lru
            .iter()
            .filter_map(move |key| self.entries.get(key).map(|slot| (key, &slot.entry)))
    }

    // == Remove Expired ==
    /// Removes every entry expired at `now`, regardless of recency.
    ///
    /// Returns the number of entries removed.
    pub fn remove_expired(&mut self, now: Instant) -> usize {
        let expired_keys: Vec<K> = self
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove(key);
        }

        expired_keys.len()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }
}

impl<K, V> Default for EntryStore<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
