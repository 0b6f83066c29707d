//! Cache configuration and construction.
//!
//! Collects the recognized options, validates them once, and splits the
//! total capacity across shards.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use evictkit::builder::CacheBuilder;
//! use evictkit::policy::PolicyKind;
//!
//! let cache = CacheBuilder::new(100)
//!     .shard_count(4)
//!     .policy(PolicyKind::Lfu)
//!     .lock_timeout(Duration::from_millis(50))
//!     .build::<u64, String>()?;
//! cache.put(1, "hello".to_string())?;
//! assert_eq!(cache.get(&1)?, Some("hello".to_string()));
//! # Ok::<(), evictkit::error::CacheError>(())
//! ```

use std::hash::Hash;
use std::time::Duration;

use crate::cache::Cache;
use crate::error::CacheError;
use crate::policy::PolicyKind;

/// Builder for [`Cache`] instances.
///
/// | Option         | Default | Meaning                                  |
/// |----------------|---------|------------------------------------------|
/// | `capacity`     | -       | total entries across all shards (> 0)    |
/// | `shard_count`  | 1       | number of independently locked shards    |
/// | `policy`       | LRU     | initial eviction policy                  |
/// | `lock_timeout` | zero    | max lock wait; zero waits indefinitely   |
/// | `seed`         | 0       | hash seed for key-to-shard routing       |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheBuilder {
    capacity: usize,
    shard_count: usize,
    policy: PolicyKind,
    lock_timeout: Duration,
    seed: u64,
}

impl CacheBuilder {
    /// Create a new cache builder with the specified total capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            shard_count: 1,
            policy: PolicyKind::default(),
            lock_timeout: Duration::ZERO,
            seed: 0,
        }
    }

    pub fn shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    pub fn policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Bound on every lock wait. `Duration::ZERO` blocks until acquired.
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn shards(&self) -> usize {
        self.shard_count
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.policy
    }

    pub fn timeout(&self) -> Duration {
        self.lock_timeout
    }

    pub fn hash_seed(&self) -> u64 {
        self.seed
    }

    /// Rejects a zero capacity, zero shards, or fewer slots than shards.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.capacity == 0 || self.shard_count == 0 || self.capacity < self.shard_count {
            return Err(CacheError::CapacityInvalid {
                capacity: self.capacity,
                shard_count: self.shard_count,
            });
        }
        Ok(())
    }

    /// Per-shard capacities: an even split with the remainder going to the
    /// lowest shard indices. Sums to `capacity`.
    pub fn shard_capacities(&self) -> Vec<usize> {
        let shards = self.shard_count.max(1);
        let base = self.capacity / shards;
        let extra = self.capacity % shards;
        (0..shards)
            .map(|index| base + usize::from(index < extra))
            .collect()
    }

    /// Build a cache from this configuration.
    ///
    /// # Type Parameters
    ///
    /// - `K`: Key type, must be `Eq + Hash + Clone`
    /// - `V`: Value type, no bounds (`get` additionally needs `V: Clone`)
    ///
    /// # Errors
    ///
    /// [`CacheError::CapacityInvalid`] if [`validate`](Self::validate) fails.
    pub fn build<K, V>(&self) -> Result<Cache<K, V>, CacheError>
    where
        K: Eq + Hash + Clone,
    {
        Cache::from_builder(self)
    }
}
