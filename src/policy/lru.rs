//! # Least Recently Used (LRU) Policy
//!
//! Keys sit in a recency list with a `key -> SlotId` side index, so every
//! notification is a hash lookup plus an O(1) splice.
//!
//! ```text
//!   index: FxHashMap<K, SlotId>
//!   ┌────────┬──────┐
//!   │ page_1 │ id_1 │──┐
//!   │ page_2 │ id_2 │──┼──┐
//!   │ page_3 │ id_3 │──┼──┼──┐
//!   └────────┴──────┘  ▼  ▼  ▼
//!   list:  head ──► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── tail
//!                    MRU                      LRU (victim)
//! ```
//!
//! ## Notifications
//!
//! | Call            | Effect                                  |
//! |-----------------|-----------------------------------------|
//! | `record_insert` | push at head (move to head if tracked)  |
//! | `record_access` | move to head                            |
//! | `record_remove` | unlink                                  |
//! | `select_victim` | peek tail                               |
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::{EvictionPolicy, LruPolicy};
//!
//! let mut lru = LruPolicy::new();
//! lru.record_insert("a");
//! lru.record_insert("b");
//! lru.record_access(&"a");
//! assert_eq!(lru.select_victim(), Some(&"b"));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::{IntrusiveList, SlotId};
use crate::policy::{EvictionPolicy, PolicyKind};

#[derive(Debug)]
pub struct LruPolicy<K> {
    list: IntrusiveList<K>,
    index: FxHashMap<K, SlotId>,
}

impl<K> LruPolicy<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            list: IntrusiveList::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            list: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.list.iter()
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.list.debug_validate_invariants();
        assert_eq!(self.list.len(), self.index.len());
        for (key, &id) in &self.index {
            assert!(self.list.get(id) == Some(key), "index points at wrong node");
        }
    }
}

impl<K> EvictionPolicy<K> for LruPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn kind(&self) -> PolicyKind {
        PolicyKind::Lru
    }

    fn record_insert(&mut self, key: K) {
        if let Some(&id) = self.index.get(&key) {
            self.list.move_to_front(id);
            return;
        }
        let id = self.list.push_front(key.clone());
        self.index.insert(key, id);
    }

    fn record_access(&mut self, key: &K) {
        if let Some(&id) = self.index.get(key) {
            self.list.move_to_front(id);
        }
    }

    fn record_remove(&mut self, key: &K) {
        if let Some(id) = self.index.remove(key) {
            self.list.remove(id);
        }
    }

    fn select_victim(&self) -> Option<&K> {
        self.list.back()
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }
}

impl<K> Default for LruPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
