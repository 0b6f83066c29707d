//! Deterministic key-to-shard mapping.
//!
//! ```text
//!   key ──► hash(seed, key) % shards ──► shard index
//!
//!   ┌─────────┬─────────┬─────────┬─────────┐
//!   │ Shard 0 │ Shard 1 │ Shard 2 │ Shard 3 │
//!   │  A, E   │  B, F   │  C, G   │  D, H   │
//!   └─────────┴─────────┴─────────┴─────────┘
//! ```
//!
//! The hasher is `DefaultHasher::new()`, which uses fixed keys, so a key maps
//! to the same shard for the whole lifetime of a cache. The seed lets two
//! caches spread the same keys differently.
//!
//! ```
//! use evictkit::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4, 0);
//! let shard = selector.shard_for_key(&"user:123");
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_key(&"user:123"), shard);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards. Zero is clamped to one.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Maps `key` to a shard index in `[0, shard_count)`.
    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        if self.shards == 1 {
            return 0;
        }
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() % self.shards as u64) as usize
    }
}

impl Default for ShardSelector {
    fn default() -> Self {
        Self::new(1, 0)
    }
}
