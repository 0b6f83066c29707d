//! Sharded cache façade.
//!
//! ## Architecture
//!
//! ```text
//!   client ──► Cache::put/get/delete(key)
//!                  │
//!                  │  ShardSelector: hash(seed, key) % shard_count
//!                  ▼
//!   ┌───────────────────┬───────────────────┬───────────────────┐
//!   │ Shard 0           │ Shard 1           │ Shard N-1         │
//!   │  Mutex<Store>     │  Mutex<Store>     │  Mutex<Store>     │
//!   │  capacity c0      │  capacity c1      │  capacity cN-1    │
//!   └───────────────────┴───────────────────┴───────────────────┘
//!                  │
//!                  ▼
//!   ShardCounters (lock-free) ──► Cache::stats()
//! ```
//!
//! ## Consistency
//!
//! - Each key lives in exactly one shard for the cache's lifetime, and each
//!   single-key operation is atomic under that shard's lock.
//! - Capacity is split per shard (remainder to the lowest indices), so the
//!   global bound `len() <= capacity` always holds, but a skewed key
//!   distribution can evict from one shard while another still has room.
//! - Nothing orders operations on different shards.
//!
//! ## Policy switches
//!
//! [`Cache::set_policy`] first takes a switch lock, so concurrent switches
//! serialize, then every shard lock in ascending index order before touching
//! any shard. Either all shards are rebuilt under the new policy or none are.
//!
//! ## Example
//!
//! ```
//! use evictkit::builder::CacheBuilder;
//! use evictkit::policy::PolicyKind;
//!
//! let cache = CacheBuilder::new(2).policy(PolicyKind::Lru).build::<&str, i32>()?;
//! cache.put("a", 1)?;
//! cache.put("b", 2)?;
//! assert_eq!(cache.get(&"a")?, Some(1));
//! cache.put("c", 3)?;
//! assert_eq!(cache.get(&"b")?, None);
//!
//! cache.set_policy(PolicyKind::Fifo)?;
//! assert_eq!(cache.policy(), PolicyKind::Fifo);
//! # Ok::<(), evictkit::error::CacheError>(())
//! ```

pub mod shard;

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};

pub use shard::Shard;

use crate::builder::CacheBuilder;
use crate::ds::ShardSelector;
use crate::error::CacheError;
use crate::metrics::CacheStats;
use crate::policy::PolicyKind;
use crate::store::CacheStore;

pub struct Cache<K, V> {
    shards: Box<[Shard<K, V>]>,
    selector: ShardSelector,
    capacity: usize,
    lock_timeout: Duration,
    policy: AtomicU8,
    switch_lock: Mutex<()>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Single-shard cache with no lock timeout.
    pub fn new(capacity: usize, policy: PolicyKind) -> Result<Self, CacheError> {
        CacheBuilder::new(capacity).policy(policy).build()
    }

    pub fn builder(capacity: usize) -> CacheBuilder {
        CacheBuilder::new(capacity)
    }

    pub(crate) fn from_builder(builder: &CacheBuilder) -> Result<Self, CacheError> {
        builder.validate()?;
        let shards: Box<[Shard<K, V>]> = builder
            .shard_capacities()
            .into_iter()
            .enumerate()
            .map(|(index, capacity)| {
                Shard::new(index, capacity, builder.policy_kind(), builder.timeout())
            })
            .collect();

        tracing::debug!(
            capacity = builder.capacity(),
            shards = shards.len(),
            policy = %builder.policy_kind(),
            "cache created"
        );

        Ok(Self {
            selector: ShardSelector::new(shards.len(), builder.hash_seed()),
            shards,
            capacity: builder.capacity(),
            lock_timeout: builder.timeout(),
            policy: AtomicU8::new(builder.policy_kind().as_u8()),
            switch_lock: Mutex::new(()),
        })
    }

    /// Inserts or overwrites `key`, evicting from its shard if that shard is
    /// full.
    pub fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        self.shard_for(&key).put(key, value)
    }

    /// Returns a clone of the value for `key`; a miss is `Ok(None)`.
    pub fn get(&self, key: &K) -> Result<Option<V>, CacheError>
    where
        V: Clone,
    {
        self.shard_for(key).get(key)
    }

    /// Removes `key`; returns whether it was present.
    pub fn delete(&self, key: &K) -> Result<bool, CacheError> {
        self.shard_for(key).delete(key)
    }

    /// Reads `key` without affecting eviction order or statistics.
    pub fn peek(&self, key: &K) -> Result<Option<V>, CacheError>
    where
        V: Clone,
    {
        self.shard_for(key).peek(key)
    }

    pub fn contains(&self, key: &K) -> Result<bool, CacheError> {
        self.shard_for(key).contains(key)
    }

    /// Total entries, summed from per-shard counts without locking.
    pub fn len(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn shards(&self) -> &[Shard<K, V>] {
        &self.shards
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// The policy every shard currently runs.
    pub fn policy(&self) -> PolicyKind {
        PolicyKind::from_u8(self.policy.load(Ordering::Acquire))
    }

    /// Replaces the eviction policy on every shard.
    ///
    /// Each shard's new policy is populated from the shard's current keys in
    /// insertion order, so LRU recency restarts at insertion order and LFU
    /// frequencies restart at 1. Operations on the cache block until the
    /// switch finishes.
    pub fn set_policy(&self, kind: PolicyKind) -> Result<(), CacheError> {
        let deadline = self.deadline();
        let _switching = self.acquire_switch_lock(deadline)?;
        let mut stores = self.lock_all(deadline)?;

        let previous = self.policy();
        for (shard, store) in self.shards.iter().zip(stores.iter_mut()) {
            shard.switch_policy(store, kind);
        }
        self.policy.store(kind.as_u8(), Ordering::Release);
        drop(stores);

        tracing::debug!(
            from = %previous,
            to = %kind,
            shards = self.shards.len(),
            "eviction policy switched"
        );
        Ok(())
    }

    /// Removes every entry. Shards are locked in ascending order, like
    /// [`set_policy`](Self::set_policy), and emptied together.
    pub fn clear(&self) -> Result<(), CacheError> {
        let mut stores = self.lock_all(self.deadline())?;
        for (shard, store) in self.shards.iter().zip(stores.iter_mut()) {
            shard.clear_locked(store);
        }
        tracing::debug!(shards = self.shards.len(), "cache cleared");
        Ok(())
    }

    /// Counters summed over all shards.
    pub fn stats(&self) -> CacheStats {
        self.shards.iter().map(Shard::stats).sum()
    }

    /// Entry count of each shard, in shard order.
    pub fn shard_lens(&self) -> Vec<usize> {
        self.shards.iter().map(Shard::len).collect()
    }

    /// Locks each shard in turn and verifies its size bound and the
    /// store/policy key bijection.
    pub fn check_invariants(&self) -> Result<(), CacheError> {
        for shard in self.shards.iter() {
            let store = shard.lock()?;
            store.check_invariants()?;
            if store.policy_kind() != self.policy() {
                return Err(crate::error::InvariantError::new(format!(
                    "shard {} runs {} while the cache reports {}",
                    shard.index(),
                    store.policy_kind(),
                    self.policy()
                ))
                .into());
            }
        }
        Ok(())
    }

    fn shard_for(&self, key: &K) -> &Shard<K, V> {
        &self.shards[self.selector.shard_for_key(key)]
    }

    fn deadline(&self) -> Option<Instant> {
        shard::lock_deadline(self.lock_timeout)
    }

    fn acquire_switch_lock(
        &self,
        deadline: Option<Instant>,
    ) -> Result<MutexGuard<'_, ()>, CacheError> {
        let Some(deadline) = deadline else {
            return Ok(self.switch_lock.lock());
        };
        self.switch_lock.try_lock_until(deadline).ok_or_else(|| {
            tracing::warn!(
                timeout = ?self.lock_timeout,
                "policy switch already in progress"
            );
            CacheError::PolicySwitchInProgress {
                timeout: self.lock_timeout,
            }
        })
    }

    /// Locks every shard in ascending index order. On failure the guards
    /// taken so far are released and nothing has been modified.
    fn lock_all(
        &self,
        deadline: Option<Instant>,
    ) -> Result<Vec<MutexGuard<'_, CacheStore<K, V>>>, CacheError> {
        self.shards
            .iter()
            .map(|shard| shard.lock_until(deadline))
            .collect()
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("capacity", &self.capacity)
            .field("shards", &self.shards)
            .field(
                "policy",
                &PolicyKind::from_u8(self.policy.load(Ordering::Relaxed)),
            )
            .field("lock_timeout", &self.lock_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn single(capacity: usize, policy: PolicyKind) -> Cache<&'static str, i32> {
        Cache::new(capacity, policy).unwrap()
    }

    #[test]
    fn new_builds_single_shard_cache() {
        let cache = single(8, PolicyKind::Lfu);
        assert_eq!(cache.shard_count(), 1);
        assert_eq!(cache.capacity(), 8);
        assert_eq!(cache.policy(), PolicyKind::Lfu);
        assert!(cache.is_empty());
        assert_eq!(cache.lock_timeout(), Duration::ZERO);
    }

    #[test]
    fn stats_count_hits_misses_and_evictions() {
        let cache = single(2, PolicyKind::Lru);
        cache.put("a", 1).unwrap();
        cache.put("b", 2).unwrap();
        cache.get(&"a").unwrap();
        cache.get(&"zzz").unwrap();
        cache.put("c", 3).unwrap();
        cache.delete(&"c").unwrap();

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.inserts, 3);
        assert_eq!(stats.removals, 1);
    }

    #[test]
    fn set_policy_rebuilds_every_shard() {
        let cache: Cache<u32, u32> = CacheBuilder::new(400).shard_count(4).build().unwrap();
        for key in 0..40 {
            cache.put(key, key).unwrap();
        }
        cache.set_policy(PolicyKind::Lfu).unwrap();
        assert_eq!(cache.policy(), PolicyKind::Lfu);
        assert_eq!(cache.stats().policy_switches, 4);
        assert_eq!(cache.len(), 40);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn clear_empties_all_shards() {
        let cache: Cache<u32, u32> = CacheBuilder::new(16).shard_count(4).build().unwrap();
        for key in 0..16 {
            cache.put(key, key).unwrap();
        }
        cache.clear().unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.shard_lens(), vec![0, 0, 0, 0]);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn set_policy_times_out_while_a_shard_is_held() {
        let cache: Arc<Cache<u32, u32>> = Arc::new(
            CacheBuilder::new(8)
                .shard_count(2)
                .lock_timeout(Duration::from_millis(20))
                .build()
                .unwrap(),
        );
        cache.put(1, 1).unwrap();

        let held = cache.shards()[1].lock().unwrap();
        let switcher = cache.clone();
        let result = thread::spawn(move || switcher.set_policy(PolicyKind::Fifo))
            .join()
            .unwrap();
        drop(held);

        assert!(matches!(result, Err(CacheError::LockTimeout { shard: 1, .. })));
        // nothing was switched, shard 0 included
        assert_eq!(cache.policy(), PolicyKind::Lru);
        assert_eq!(cache.stats().policy_switches, 0);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn concurrent_switch_reports_in_progress() {
        let cache: Arc<Cache<u32, u32>> = Arc::new(
            CacheBuilder::new(4)
                .lock_timeout(Duration::from_millis(20))
                .build()
                .unwrap(),
        );

        let switching = cache.switch_lock.lock();
        let switcher = cache.clone();
        let result = thread::spawn(move || switcher.set_policy(PolicyKind::Lfu))
            .join()
            .unwrap();
        drop(switching);

        assert_eq!(
            result,
            Err(CacheError::PolicySwitchInProgress {
                timeout: Duration::from_millis(20)
            })
        );
        cache.set_policy(PolicyKind::Lfu).unwrap();
        assert_eq!(cache.policy(), PolicyKind::Lfu);
    }

    #[test]
    fn maximal_timeout_blocks_instead_of_overflowing() {
        let cache: Cache<u32, u32> = CacheBuilder::new(4)
            .shard_count(2)
            .lock_timeout(Duration::MAX)
            .build()
            .unwrap();
        cache.put(1, 1).unwrap();
        assert_eq!(cache.get(&1).unwrap(), Some(1));
        cache.set_policy(PolicyKind::Fifo).unwrap();
        assert_eq!(cache.policy(), PolicyKind::Fifo);
        cache.clear().unwrap();
        assert!(cache.is_empty());
        cache.check_invariants().unwrap();
    }

    #[test]
    fn cache_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Cache<String, Vec<u8>>>();
    }
}
