//! Frequency buckets for O(1) LFU tracking.
//!
//! Keys are grouped by access frequency. Each frequency owns a doubly linked
//! bucket of entries, and the non-empty buckets are themselves linked in
//! ascending frequency order, so finding "the next non-empty bucket above
//! the minimum" never scans.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>          entries: SlotArena<Entry<K>>
//!   ┌──────────┬────────┐                ┌──────┬───────────────────────┐
//!   │ "page_a" │  id_0  │ ─────────────► │ id_0 │ freq: 3, prev/next    │
//!   │ "page_b" │  id_1  │ ─────────────► │ id_1 │ freq: 1, prev/next    │
//!   │ "page_c" │  id_2  │ ─────────────► │ id_2 │ freq: 1, prev/next    │
//!   └──────────┴────────┘                └──────┴───────────────────────┘
//!
//!   buckets: FxHashMap<u64, Bucket>
//!
//!   min_freq = 1
//!      │
//!      ▼
//!   freq=1: head ─► [id_2] ◄──► [id_1] ◄── tail   (tail arrived first)
//!      │ next
//!      ▼
//!   freq=3: head ─► [id_0] ◄── tail
//! ```
//!
//! Within a bucket, entries are ordered by arrival into that bucket: new keys
//! and touched keys are pushed at the head, and the eviction candidate is the
//! tail. Ties at the minimum frequency are therefore broken by insertion
//! order, oldest first.
//!
//! ## Operations
//!
//! | Operation   | Time | Notes                                   |
//! |-------------|------|-----------------------------------------|
//! | `insert`    | O(1) | New key starts at freq = 1              |
//! | `touch`     | O(1) | freq + 1, moves to head of next bucket  |
//! | `remove`    | O(1) | Unlinks, drops bucket if emptied        |
//! | `peek_min`  | O(1) | Tail of the min-frequency bucket        |
//! | `pop_min`   | O(1) | `peek_min` + `remove`                   |
//!
//! ## Example
//!
//! ```
//! use evictkit::ds::FrequencyBuckets;
//!
//! let mut freq = FrequencyBuckets::new();
//! freq.insert("page_a");
//! freq.insert("page_b");
//! freq.insert("page_c");
//!
//! freq.touch(&"page_a");
//! freq.touch(&"page_a");
//!
//! assert_eq!(freq.peek_min(), Some((&"page_b", 1)));
//! assert_eq!(freq.pop_min(), Some(("page_b", 1)));
//! assert_eq!(freq.pop_min(), Some(("page_c", 1)));
//! assert_eq!(freq.pop_min(), Some(("page_a", 3)));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Entry<K> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    freq: u64,
    key: K,
}

#[derive(Debug, Default)]
struct Bucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    prev: Option<u64>,
    next: Option<u64>,
}

/// O(1) LFU metadata tracker with insertion-order tie-breaking.
#[derive(Debug)]
pub struct FrequencyBuckets<K> {
    entries: SlotArena<Entry<K>>,
    index: FxHashMap<K, SlotId>,
    buckets: FxHashMap<u64, Bucket>,
    // 0 when empty
    min_freq: u64,
}

impl<K> FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: SlotArena::new(),
            index: FxHashMap::default(),
            buckets: FxHashMap::default(),
            min_freq: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SlotArena::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.entries.get(id).map(|entry| entry.freq)
    }

    pub fn min_freq(&self) -> Option<u64> {
        (self.min_freq != 0).then_some(self.min_freq)
    }

    /// Iterates tracked keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.index.keys()
    }

    /// Inserts `key` at frequency 1. Returns `false` if already tracked.
    pub fn insert(&mut self, key: K) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }

        let id = self.entries.insert(Entry {
            prev: None,
            next: None,
            freq: 1,
            key: key.clone(),
        });
        self.index.insert(key, id);

        if !self.buckets.contains_key(&1) {
            // bucket 1 is always the lowest possible, so it links in front of min
            let next = self.min_freq().filter(|&f| f != 1);
            self.insert_bucket(1, None, next);
        }
        self.list_push_front(1, id);
        self.min_freq = 1;
        true
    }

    /// Increments the frequency of `key` and returns the new value.
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        let current = self.entries.get(id)?.freq;
        if current == u64::MAX {
            self.list_remove(current, id)?;
            self.list_push_front(current, id);
            return Some(current);
        }
        let next_freq = current + 1;

        let (prev_bucket, next_bucket) = {
            let bucket = self.buckets.get(&current)?;
            (bucket.prev, bucket.next)
        };

        self.list_remove(current, id)?;
        let emptied = self.bucket_is_empty(current);
        if emptied {
            self.remove_bucket(current, prev_bucket, next_bucket);
            if self.min_freq == current {
                self.min_freq = next_bucket.unwrap_or(0);
            }
        }

        if !self.buckets.contains_key(&next_freq) {
            let prev = if emptied { prev_bucket } else { Some(current) };
            self.insert_bucket(next_freq, prev, next_bucket);
        }

        if let Some(entry) = self.entries.get_mut(id) {
            entry.freq = next_freq;
        }
        self.list_push_front(next_freq, id);
        if self.min_freq == 0 || next_freq < self.min_freq {
            self.min_freq = next_freq;
        }
        Some(next_freq)
    }

    /// Stops tracking `key` and returns its last frequency.
    pub fn remove(&mut self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        let freq = self.entries.get(id)?.freq;
        self.unlink(freq, id)?;
        self.index.remove(key);
        self.entries.remove(id).map(|entry| entry.freq)
    }

    /// Eviction candidate: oldest arrival in the min-frequency bucket.
    pub fn peek_min(&self) -> Option<(&K, u64)> {
        let bucket = self.buckets.get(&self.min_freq()?)?;
        let entry = self.entries.get(bucket.tail?)?;
        Some((&entry.key, entry.freq))
    }

    pub fn pop_min(&mut self) -> Option<(K, u64)> {
        let freq = self.min_freq()?;
        let id = self.buckets.get(&freq)?.tail?;
        self.unlink(freq, id)?;
        let entry = self.entries.remove(id)?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.freq))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }

    /// Removes `id` from bucket `freq`, dropping the bucket if it empties.
    fn unlink(&mut self, freq: u64, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let bucket = self.buckets.get(&freq)?;
            (bucket.prev, bucket.next)
        };
        self.list_remove(freq, id)?;
        if self.bucket_is_empty(freq) {
            self.remove_bucket(freq, prev, next);
            if self.min_freq == freq {
                self.min_freq = next.unwrap_or(0);
            }
        }
        Some(())
    }

    fn bucket_is_empty(&self, freq: u64) -> bool {
        self.buckets
            .get(&freq)
            .is_none_or(|bucket| bucket.head.is_none())
    }

    fn insert_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        self.buckets.insert(
            freq,
            Bucket {
                head: None,
                tail: None,
                prev,
                next,
            },
        );
        if let Some(prev_bucket) = prev.and_then(|p| self.buckets.get_mut(&p)) {
            prev_bucket.next = Some(freq);
        }
        if let Some(next_bucket) = next.and_then(|n| self.buckets.get_mut(&n)) {
            next_bucket.prev = Some(freq);
        }
    }

    fn remove_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        if let Some(prev_bucket) = prev.and_then(|p| self.buckets.get_mut(&p)) {
            prev_bucket.next = next;
        }
        if let Some(next_bucket) = next.and_then(|n| self.buckets.get_mut(&n)) {
            next_bucket.prev = prev;
        }
        self.buckets.remove(&freq);
    }

    fn list_push_front(&mut self, freq: u64, id: SlotId) {
        let Some(bucket) = self.buckets.get_mut(&freq) else {
            return;
        };
        let old_head = bucket.head;
        match old_head {
            Some(old) => {
                if let Some(entry) = self.entries.get_mut(old) {
                    entry.prev = Some(id);
                }
            },
            None => bucket.tail = Some(id),
        }
        bucket.head = Some(id);
        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = old_head;
        }
    }

    fn list_remove(&mut self, freq: u64, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let entry = self.entries.get(id)?;
            (entry.prev, entry.next)
        };

        let bucket = self.buckets.get_mut(&freq)?;
        match prev {
            Some(p) => {
                if let Some(entry) = self.entries.get_mut(p) {
                    entry.next = next;
                }
            },
            None => bucket.head = next,
        }
        match next {
            Some(n) => {
                if let Some(entry) = self.entries.get_mut(n) {
                    entry.prev = prev;
                }
            },
            None => bucket.tail = prev,
        }

        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = None;
        }
        Some(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.len(), self.index.len());

        if self.is_empty() {
            assert!(self.buckets.is_empty());
            assert_eq!(self.min_freq, 0);
            return;
        }

        assert!(self.buckets.contains_key(&self.min_freq));
        let mut total = 0usize;
        for (&freq, bucket) in &self.buckets {
            assert!(freq >= self.min_freq);
            match bucket.prev {
                Some(prev) => {
                    assert!(prev < freq);
                    assert_eq!(self.buckets[&prev].next, Some(freq));
                },
                None => assert_eq!(self.min_freq, freq),
            }
            if let Some(next) = bucket.next {
                assert!(next > freq);
                assert_eq!(self.buckets[&next].prev, Some(freq));
            }

            let mut current = bucket.head;
            let mut last = None;
            let mut count = 0usize;
            while let Some(id) = current {
                let entry = self.entries.get(id).expect("bucket entry missing");
                assert_eq!(entry.freq, freq);
                assert_eq!(entry.prev, last);
                assert_eq!(self.index.get(&entry.key), Some(&id));
                last = Some(id);
                current = entry.next;
                count += 1;
            }
            assert_eq!(bucket.tail, last);
            assert!(count > 0, "empty bucket {freq} left linked");
            total += count;
        }
        assert_eq!(total, self.len());
    }
}

impl<K> Default for FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
