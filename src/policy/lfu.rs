//! # Least Frequently Used (LFU) Policy
//!
//! Thin adapter over [`FrequencyBuckets`]: every key carries a frequency,
//! keys with equal frequency share a bucket ordered by arrival, and the
//! lowest non-empty bucket is tracked so the victim is found in O(1).
//!
//! ```text
//!   min_freq = 1
//!   freq=1: [c] ◄──► [b]      ◄── victim: b (arrived first)
//!   freq=3: [a]
//! ```
//!
//! | Call            | Effect                                           |
//! |-----------------|--------------------------------------------------|
//! | `record_insert` | freq = 1, min_freq = 1                           |
//! | `record_access` | freq + 1; min advances if its bucket emptied     |
//! | `record_remove` | unlink; min advances if its bucket emptied       |
//! | `select_victim` | oldest arrival in the min-frequency bucket       |
//!
//! Frequencies are not aged. A key that was hot long ago keeps its count
//! until it is removed or the policy is rebuilt by a policy switch.
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::{EvictionPolicy, LfuPolicy};
//!
//! let mut lfu = LfuPolicy::new();
//! lfu.record_insert("a");
//! lfu.record_insert("b");
//! lfu.record_access(&"a");
//! assert_eq!(lfu.select_victim(), Some(&"b"));
//! assert_eq!(lfu.frequency(&"a"), Some(2));
//! ```

use std::hash::Hash;

use crate::ds::FrequencyBuckets;
use crate::policy::{EvictionPolicy, PolicyKind};

#[derive(Debug)]
pub struct LfuPolicy<K> {
    buckets: FrequencyBuckets<K>,
}

impl<K> LfuPolicy<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            buckets: FrequencyBuckets::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: FrequencyBuckets::with_capacity(capacity),
        }
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.buckets.frequency(key)
    }

    pub fn min_frequency(&self) -> Option<u64> {
        self.buckets.min_freq()
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.buckets.debug_validate_invariants();
    }
}

impl<K> EvictionPolicy<K> for LfuPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn kind(&self) -> PolicyKind {
        PolicyKind::Lfu
    }

    fn record_insert(&mut self, key: K) {
        if self.buckets.contains(&key) {
            self.buckets.touch(&key);
            return;
        }
        self.buckets.insert(key);
    }

    fn record_access(&mut self, key: &K) {
        self.buckets.touch(key);
    }

    fn record_remove(&mut self, key: &K) {
        self.buckets.remove(key);
    }

    fn select_victim(&self) -> Option<&K> {
        self.buckets.peek_min().map(|(key, _)| key)
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }

    fn contains(&self, key: &K) -> bool {
        self.buckets.contains(key)
    }

    fn clear(&mut self) {
        self.buckets.clear();
    }
}

impl<K> Default for LfuPolicy<K>
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
    fn victim_has_lowest_frequency() {
        let mut lfu = LfuPolicy::new();
        lfu.record_insert("a");
        lfu.record_insert("b");
        lfu.record_access(&"a");
        lfu.record_access(&"a");
        assert_eq!(lfu.select_victim(), Some(&"b"));
        assert_eq!(lfu.frequency(&"a"), Some(3));
        assert_eq!(lfu.min_frequency(), Some(1));
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut lfu = LfuPolicy::new();
        for key in [3, 1, 2] {
            lfu.record_insert(key);
        }
        assert_eq!(lfu.select_victim(), Some(&3));
        lfu.record_remove(&3);
        assert_eq!(lfu.select_victim(), Some(&1));
        lfu.debug_validate_invariants();
    }

    #[test]
    fn min_frequency_advances_upward_on_access() {
        let mut lfu = LfuPolicy::new();
        lfu.record_insert("a");
        lfu.record_insert("b");
        for _ in 0..3 {
            lfu.record_access(&"b");
        }
        lfu.record_access(&"a");
        // a: 2, b: 4
        assert_eq!(lfu.min_frequency(), Some(2));
        assert_eq!(lfu.select_victim(), Some(&"a"));
        lfu.debug_validate_invariants();
    }

    #[test]
    fn remove_of_last_min_key_advances_min() {
        let mut lfu = LfuPolicy::new();
        lfu.record_insert("a");
        lfu.record_insert("b");
        lfu.record_access(&"b");
        lfu.record_remove(&"a");
        assert_eq!(lfu.min_frequency(), Some(2));
        assert_eq!(lfu.select_victim(), Some(&"b"));
        lfu.record_remove(&"b");
        assert_eq!(lfu.select_victim(), None);
        assert!(lfu.is_empty());
    }

    #[test]
    fn new_key_resets_min_to_one() {
        let mut lfu = LfuPolicy::new();
        lfu.record_insert("hot");
        lfu.record_access(&"hot");
        lfu.record_insert("cold");
        assert_eq!(lfu.min_frequency(), Some(1));
        assert_eq!(lfu.select_victim(), Some(&"cold"));
    }

    #[test]
    fn clear_forgets_frequencies() {
        let mut lfu = LfuPolicy::default();
        lfu.record_insert(7u64);
        lfu.record_access(&7);
        lfu.clear();
        assert_eq!(lfu.frequency(&7), None);
        lfu.record_insert(7);
        assert_eq!(lfu.frequency(&7), Some(1));
    }
}
