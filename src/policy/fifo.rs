//! # First In, First Out (FIFO) Policy
//!
//! Keys are queued strictly by insertion time. Reads never reorder the queue.
//!
//! ```text
//!   head (victim)                                   tail (newest)
//!     │                                               │
//!     ▼                                               ▼
//!   [id_a] ◄──► [id_b] ◄──► [id_c] ◄──► [id_d] ◄──► [id_e]
//!                  ▲
//!                  └── delete(b): unlinked in O(1) through the side index
//! ```
//!
//! An explicit delete can take a key out of the middle of the queue, so the
//! queue is an [`IntrusiveList`] with a `key -> SlotId` index rather than a
//! `VecDeque`; there are never stale entries to skip at eviction time.
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::{EvictionPolicy, FifoPolicy};
//!
//! let mut fifo = FifoPolicy::new();
//! fifo.record_insert("a");
//! fifo.record_insert("b");
//! fifo.record_access(&"a");
//! assert_eq!(fifo.select_victim(), Some(&"a"));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::{IntrusiveList, SlotId};
use crate::policy::{EvictionPolicy, PolicyKind};

#[derive(Debug)]
pub struct FifoPolicy<K> {
    queue: IntrusiveList<K>,
    index: FxHashMap<K, SlotId>,
}

impl<K> FifoPolicy<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            queue: IntrusiveList::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.queue.iter()
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.queue.debug_validate_invariants();
        assert_eq!(self.queue.len(), self.index.len());
        for (key, &id) in &self.index {
            assert!(self.queue.get(id) == Some(key), "index points at wrong node");
        }
    }
}

impl<K> EvictionPolicy<K> for FifoPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn kind(&self) -> PolicyKind {
        PolicyKind::Fifo
    }

    fn record_insert(&mut self, key: K) {
        if self.index.contains_key(&key) {
            return;
        }
        let id = self.queue.push_back(key.clone());
        self.index.insert(key, id);
    }

    fn record_access(&mut self, _key: &K) {}

    fn record_remove(&mut self, key: &K) {
        if let Some(id) = self.index.remove(key) {
            self.queue.remove(id);
        }
    }

    fn select_victim(&self) -> Option<&K> {
        self.queue.front()
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.index.clear();
    }
}

impl<K> Default for FifoPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn victim_is_oldest_insert_regardless_of_reads() {
        let mut fifo = FifoPolicy::new();
        fifo.record_insert(1);
        fifo.record_insert(2);
        fifo.record_insert(3);
        for _ in 0..5 {
            fifo.record_access(&1);
        }
        assert_eq!(fifo.select_victim(), Some(&1));
        assert_eq!(fifo.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn removing_middle_key_keeps_queue_order() {
        let mut fifo = FifoPolicy::new();
        for key in ["a", "b", "c"] {
            fifo.record_insert(key);
        }
        fifo.record_remove(&"b");
        assert_eq!(fifo.iter().copied().collect::<Vec<_>>(), vec!["a", "c"]);
        assert!(!fifo.contains(&"b"));

        fifo.record_remove(&"a");
        assert_eq!(fifo.select_victim(), Some(&"c"));
        fifo.debug_validate_invariants();
    }

    #[test]
    fn reinserted_key_goes_to_the_back() {
        let mut fifo = FifoPolicy::new();
        fifo.record_insert("a");
        fifo.record_insert("b");
        fifo.record_remove(&"a");
        fifo.record_insert("a");
        assert_eq!(fifo.select_victim(), Some(&"b"));
    }

    #[test]
    fn duplicate_insert_does_not_requeue() {
        let mut fifo = FifoPolicy::new();
        fifo.record_insert("a");
        fifo.record_insert("b");
        fifo.record_insert("a");
        assert_eq!(fifo.len(), 2);
        assert_eq!(fifo.select_victim(), Some(&"a"));
    }

    #[test]
    fn clear_empties_queue() {
        let mut fifo: FifoPolicy<u32> = FifoPolicy::with_capacity(4);
        fifo.record_insert(1);
        fifo.clear();
        assert!(fifo.is_empty());
        assert_eq!(fifo.select_victim(), None);
        fifo.debug_validate_invariants();
    }
}
