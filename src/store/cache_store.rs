//! Key/value store with pluggable eviction.
//!
//! ## Architecture
//! - Entries live in an `FxHashMap<K, Entry<K, V>>`; capacity is an entry
//!   count fixed at construction.
//! - The store owns exactly one [`EvictionPolicy`] and notifies it of every
//!   insert, access and removal, so the policy tracks exactly the stored
//!   key set between operations.
//! - When a new key arrives at a full store, the policy names a victim and
//!   the store removes it before inserting.
//!
//! ## Core Operations
//! - `put`: insert or overwrite; may evict one entry.
//! - `get`: read and record an access.
//! - `peek` / `contains`: read without touching the policy.
//! - `delete`: remove by key.
//! - `swap_policy`: replace the policy, replaying stored keys in insertion
//!   order.
//!
//! ## Example Usage
//! ```rust
//! use evictkit::policy::PolicyKind;
//! use evictkit::store::{CacheStore, PutOutcome};
//!
//! let mut store = CacheStore::new(2, PolicyKind::Lru);
//! store.put("a", 1).unwrap();
//! store.put("b", 2).unwrap();
//! assert_eq!(store.get(&"a"), Some(&1));
//!
//! let outcome = store.put("c", 3).unwrap();
//! assert_eq!(outcome, PutOutcome::Evicted { key: "b", value: 2 });
//! ```
//!
//! ## Thread Safety
//! - Single-threaded. [`Shard`](crate::cache::Shard) wraps one store in a
//!   mutex; every call, including `get`, needs exclusive access.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::InvariantError;
use crate::policy::{AnyPolicy, EvictionPolicy, PolicyKind};
use crate::store::entry::Entry;

/// What a [`CacheStore::put`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome<K, V> {
    /// New key, no eviction needed.
    Inserted,
    /// Existing key; carries the replaced value.
    Updated(V),
    /// New key; the policy's victim was evicted to make room.
    Evicted { key: K, value: V },
}

#[derive(Debug)]
pub struct CacheStore<K, V, P = AnyPolicy<K>> {
    map: FxHashMap<K, Entry<K, V>>,
    policy: P,
    capacity: usize,
    tick: u64,
}

impl<K, V> CacheStore<K, V, AnyPolicy<K>>
where
    K: Eq + Hash + Clone,
{
    /// Creates a store holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize, kind: PolicyKind) -> Self {
        let capacity = capacity.max(1);
        Self::with_policy(capacity, AnyPolicy::new(kind, capacity))
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    /// Rebuilds the policy as `kind`; returns the previous kind.
    pub fn set_policy(&mut self, kind: PolicyKind) -> PolicyKind {
        let fresh = AnyPolicy::new(kind, self.capacity);
        self.swap_policy(fresh).kind()
    }
}

impl<K, V, P> CacheStore<K, V, P>
where
    K: Eq + Hash + Clone,
    P: EvictionPolicy<K>,
{
    /// Creates a store around `policy`. Any keys the policy already tracks
    /// are discarded.
    pub fn with_policy(capacity: usize, mut policy: P) -> Self {
        policy.clear();
        let capacity = capacity.max(1);
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            policy,
            capacity,
            tick: 0,
        }
    }

    /// Inserts or overwrites `key`.
    ///
    /// Overwriting counts as an access. Inserting a new key into a full
    /// store evicts the policy's victim first. Returns an
    /// [`InvariantError`], with the store left untouched, if the policy has
    /// no victim or names a key the store does not hold.
    pub fn put(&mut self, key: K, value: V) -> Result<PutOutcome<K, V>, InvariantError> {
        if self.map.contains_key(&key) {
            let tick = self.next_tick();
            let entry = self.map.get_mut(&key).ok_or_else(|| {
                InvariantError::new("stored key vanished during overwrite")
            })?;
            let old = std::mem::replace(&mut entry.value, value);
            entry.touch(tick);
            self.policy.record_access(&key);
            return Ok(PutOutcome::Updated(old));
        }

        let mut evicted = None;
        if self.map.len() >= self.capacity {
            let victim = self.policy.select_victim().cloned().ok_or_else(|| {
                InvariantError::new(format!(
                    "store full ({}/{}) but {} policy tracks {} keys and has no victim",
                    self.map.len(),
                    self.capacity,
                    self.policy.kind(),
                    self.policy.len(),
                ))
            })?;
            let entry = self.map.remove(&victim).ok_or_else(|| {
                InvariantError::new(format!(
                    "{} policy selected a victim that is not in the store",
                    self.policy.kind()
                ))
            })?;
            self.policy.record_remove(&victim);
            evicted = Some(entry);
        }

        let tick = self.next_tick();
        self.map.insert(key.clone(), Entry::new(key.clone(), value, tick));
        self.policy.record_insert(key);

        Ok(match evicted {
            Some(entry) => PutOutcome::Evicted {
                key: entry.key,
                value: entry.value,
            },
            None => PutOutcome::Inserted,
        })
    }

    /// Returns the value for `key` and records the access. A miss has no
    /// side effects.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.map.contains_key(key) {
            return None;
        }
        let tick = self.next_tick();
        self.policy.record_access(key);
        let entry = self.map.get_mut(key)?;
        entry.touch(tick);
        Some(&entry.value)
    }

    /// Returns the value for `key` without recording an access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.get(key).map(|entry| &entry.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Entry metadata for `key`, without recording an access.
    pub fn entry(&self, key: &K) -> Option<&Entry<K, V>> {
        self.map.get(key)
    }

    /// Removes `key`, returning its value if it was present.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let entry = self.map.remove(key)?;
        self.policy.record_remove(key);
        Some(entry.value)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Drops every entry and resets the policy.
    pub fn clear(&mut self) {
        self.map.clear();
        self.policy.clear();
    }

    /// Installs `fresh` as the policy and returns the old one.
    ///
    /// `fresh` is cleared, then told about every stored key via
    /// `record_insert`, oldest insertion first. Recency is thereby reset to
    /// insertion order and every LFU frequency restarts at 1.
    pub fn swap_policy(&mut self, mut fresh: P) -> P {
        fresh.clear();
        let mut order: Vec<(u64, &K)> = self
            .map
            .values()
            .map(|entry| (entry.inserted_at, &entry.key))
            .collect();
        order.sort_unstable_by_key(|&(inserted_at, _)| inserted_at);
        for (_, key) in order {
            fresh.record_insert(key.clone());
        }
        std::mem::replace(&mut self.policy, fresh)
    }

    /// Checks the size bound and that the policy tracks exactly the stored
    /// keys.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.map.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "size {} exceeds capacity {}",
                self.map.len(),
                self.capacity
            )));
        }
        if self.policy.len() != self.map.len() {
            return Err(InvariantError::new(format!(
                "{} policy tracks {} keys, store holds {}",
                self.policy.kind(),
                self.policy.len(),
                self.map.len()
            )));
        }
        for (key, entry) in &self.map {
            if entry.key != *key {
                return Err(InvariantError::new("entry key differs from its map key"));
            }
            if !self.policy.contains(key) {
                return Err(InvariantError::new(format!(
                    "{} policy is missing a stored key",
                    self.policy.kind()
                )));
            }
        }
        Ok(())
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(capacity: usize, kind: PolicyKind) -> CacheStore<&'static str, i32> {
        CacheStore::new(capacity, kind)
    }

    #[test]
    fn put_get_delete_basics() {
        let mut s = store(4, PolicyKind::Lru);
        assert_eq!(s.put("a", 1), Ok(PutOutcome::Inserted));
        assert_eq!(s.put("a", 2), Ok(PutOutcome::Updated(1)));
        assert_eq!(s.get(&"a"), Some(&2));
        assert_eq!(s.get(&"missing"), None);
        assert_eq!(s.len(), 1);

        assert_eq!(s.delete(&"a"), Some(2));
        assert_eq!(s.delete(&"a"), None);
        assert!(s.is_empty());
        s.check_invariants().unwrap();
    }

    #[test]
    fn full_store_evicts_policy_victim() {
        let mut s = store(2, PolicyKind::Lru);
        s.put("a", 1).unwrap();
        s.put("b", 2).unwrap();
        s.get(&"a");
        assert_eq!(
            s.put("c", 3),
            Ok(PutOutcome::Evicted {
                key: "b",
                value: 2
            })
        );
        assert!(!s.contains(&"b"));
        assert_eq!(s.len(), 2);
        s.check_invariants().unwrap();
    }

    #[test]
    fn overwrite_counts_as_access() {
        let mut lru = store(2, PolicyKind::Lru);
        lru.put("a", 1).unwrap();
        lru.put("b", 2).unwrap();
        lru.put("a", 10).unwrap();
        lru.put("c", 3).unwrap();
        assert!(lru.contains(&"a"));
        assert!(!lru.contains(&"b"));

        let mut fifo = store(2, PolicyKind::Fifo);
        fifo.put("a", 1).unwrap();
        fifo.put("b", 2).unwrap();
        fifo.put("a", 10).unwrap();
        fifo.put("c", 3).unwrap();
        assert!(!fifo.contains(&"a"));
        assert!(fifo.contains(&"b"));
    }

    #[test]
    fn miss_and_peek_have_no_side_effects() {
        let mut s = store(2, PolicyKind::Lru);
        s.put("a", 1).unwrap();
        s.put("b", 2).unwrap();
        let before = s.entry(&"a").cloned();

        assert_eq!(s.get(&"zzz"), None);
        assert_eq!(s.peek(&"a"), Some(&1));
        assert_eq!(s.entry(&"a").cloned(), before);

        // peek did not refresh "a", so it is still the LRU victim
        s.put("c", 3).unwrap();
        assert!(!s.contains(&"a"));
    }

    #[test]
    fn entry_metadata_tracks_accesses() {
        let mut s = store(4, PolicyKind::Lfu);
        s.put("a", 1).unwrap();
        s.put("b", 2).unwrap();
        s.get(&"a");
        s.put("a", 3).unwrap();

        let a = s.entry(&"a").unwrap();
        assert_eq!(a.frequency(), 3);
        assert_eq!(a.inserted_at(), 1);
        assert_eq!(a.last_access(), 4);
        assert_eq!(s.entry(&"b").unwrap().frequency(), 1);
    }

    #[test]
    fn swap_policy_replays_in_insertion_order() {
        let mut s = store(3, PolicyKind::Lru);
        s.put("a", 1).unwrap();
        s.put("b", 2).unwrap();
        s.put("c", 3).unwrap();
        s.get(&"a");
        s.delete(&"b");
        s.put("b", 4).unwrap();

        assert_eq!(s.set_policy(PolicyKind::Fifo), PolicyKind::Lru);
        assert_eq!(s.policy_kind(), PolicyKind::Fifo);
        s.check_invariants().unwrap();
        // re-inserted "b" is now the newest; "a" the oldest
        assert_eq!(s.policy().select_victim(), Some(&"a"));
    }

    #[test]
    fn switching_to_lfu_resets_frequencies() {
        let mut s = store(2, PolicyKind::Lfu);
        s.put("a", 1).unwrap();
        s.put("b", 2).unwrap();
        for _ in 0..5 {
            s.get(&"b");
        }
        s.set_policy(PolicyKind::Lfu);
        // both back at frequency 1, so the older key loses
        s.put("c", 3).unwrap();
        assert!(!s.contains(&"a"));
        s.put("d", 4).unwrap();
        assert!(!s.contains(&"b"));
    }

    #[test]
    fn clear_resets_store_and_policy() {
        let mut s = store(2, PolicyKind::Fifo);
        s.put("a", 1).unwrap();
        s.clear();
        assert!(s.is_empty());
        assert!(s.policy().is_empty());
        s.check_invariants().unwrap();
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut s = store(0, PolicyKind::Lru);
        assert_eq!(s.capacity(), 1);
        s.put("a", 1).unwrap();
        s.put("b", 2).unwrap();
        assert_eq!(s.len(), 1);
    }

    /// Forgets every key it is told about.
    #[derive(Debug, Default)]
    struct AmnesiacPolicy;

    impl EvictionPolicy<&'static str> for AmnesiacPolicy {
        fn kind(&self) -> PolicyKind {
            PolicyKind::Fifo
        }
        fn record_insert(&mut self, _key: &'static str) {}
        fn record_access(&mut self, _key: &&'static str) {}
        fn record_remove(&mut self, _key: &&'static str) {}
        fn select_victim(&self) -> Option<&&'static str> {
            None
        }
        fn len(&self) -> usize {
            0
        }
        fn contains(&self, _key: &&'static str) -> bool {
            false
        }
        fn clear(&mut self) {}
    }

    #[test]
    fn missing_victim_aborts_put_without_mutation() {
        let mut s: CacheStore<&'static str, i32, AmnesiacPolicy> =
            CacheStore::with_policy(1, AmnesiacPolicy);
        s.put("a", 1).unwrap();
        assert!(s.check_invariants().is_err());

        let err = s.put("b", 2).unwrap_err();
        assert!(err.message().contains("no victim"));
        assert_eq!(s.len(), 1);
        assert_eq!(s.peek(&"a"), Some(&1));
        assert!(!s.contains(&"b"));

        // the failed put consumed no sequence number
        s.put("a", 10).unwrap();
        assert_eq!(s.entry(&"a").map(|e| e.last_access()), Some(2));
    }
}
