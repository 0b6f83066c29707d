//! One independently locked partition of a [`Cache`](crate::cache::Cache).
//!
//! ```text
//!   Shard
//!   ┌──────────────────────────────────────────────┐
//!   │ Mutex<CacheStore<K, V>>   store + policy     │  one lock: gets mutate
//!   │                                              │  policy state too
//!   │ AtomicUsize               mirrored len       │  read without locking
//!   │ ShardCounters             hits/misses/...    │  bumped lock-free
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! Lock waits are bounded by the cache's lock timeout. A zero timeout
//! blocks until the lock is free.

use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};

use crate::error::CacheError;
use crate::metrics::{CacheStats, ShardCounters};
use crate::policy::PolicyKind;
use crate::store::{CacheStore, PutOutcome};

pub struct Shard<K, V> {
    index: usize,
    capacity: usize,
    lock_timeout: Duration,
    store: Mutex<CacheStore<K, V>>,
    len: AtomicUsize,
    counters: ShardCounters,
}

impl<K, V> Shard<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new(
        index: usize,
        capacity: usize,
        kind: PolicyKind,
        lock_timeout: Duration,
    ) -> Self {
        let store = CacheStore::new(capacity, kind);
        Self {
            index,
            capacity: store.capacity(),
            lock_timeout,
            store: Mutex::new(store),
            len: AtomicUsize::new(0),
            counters: ShardCounters::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entry count as of the last completed operation on this shard.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Locks the store, waiting at most the configured timeout.
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, CacheStore<K, V>>, CacheError> {
        self.lock_until(lock_deadline(self.lock_timeout))
    }

    /// Locks the store, giving up at `deadline`; `None` waits indefinitely.
    pub(crate) fn lock_until(
        &self,
        deadline: Option<Instant>,
    ) -> Result<MutexGuard<'_, CacheStore<K, V>>, CacheError> {
        let Some(deadline) = deadline else {
            return Ok(self.store.lock());
        };
        self.store.try_lock_until(deadline).ok_or_else(|| {
            tracing::warn!(
                shard = self.index,
                timeout = ?self.lock_timeout,
                "shard lock wait timed out"
            );
            CacheError::LockTimeout {
                shard: self.index,
                timeout: self.lock_timeout,
            }
        })
    }

    pub fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        let mut store = self.lock()?;
        let outcome = match store.put(key, value) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(
                    shard = self.index,
                    policy = %store.policy_kind(),
                    error = %err,
                    "eviction bookkeeping out of sync"
                );
                return Err(err.into());
            },
        };
        self.sync_len(&store);
        drop(store);

        // replaced or evicted values are dropped outside the lock
        match outcome {
            PutOutcome::Inserted => self.counters.inc_insert(),
            PutOutcome::Updated(_) => self.counters.inc_update(),
            PutOutcome::Evicted { .. } => {
                self.counters.inc_insert();
                self.counters.inc_eviction();
                tracing::trace!(shard = self.index, "evicted entry");
            },
        }
        Ok(())
    }

    pub fn get(&self, key: &K) -> Result<Option<V>, CacheError>
    where
        V: Clone,
    {
        let value = self.lock()?.get(key).cloned();
        match value {
            Some(_) => self.counters.inc_hit(),
            None => self.counters.inc_miss(),
        }
        Ok(value)
    }

    /// Reads without recording an access or touching the counters.
    pub fn peek(&self, key: &K) -> Result<Option<V>, CacheError>
    where
        V: Clone,
    {
        Ok(self.lock()?.peek(key).cloned())
    }

    pub fn contains(&self, key: &K) -> Result<bool, CacheError> {
        Ok(self.lock()?.contains(key))
    }

    pub fn delete(&self, key: &K) -> Result<bool, CacheError> {
        let mut store = self.lock()?;
        let removed = store.delete(key);
        self.sync_len(&store);
        drop(store);

        let found = removed.is_some();
        if found {
            self.counters.inc_removal();
        }
        Ok(found)
    }

    /// Rebuilds the policy of an already locked store.
    pub(crate) fn switch_policy(&self, store: &mut CacheStore<K, V>, kind: PolicyKind) {
        let previous = store.set_policy(kind);
        self.counters.inc_policy_switch();
        tracing::trace!(
            shard = self.index,
            from = %previous,
            to = %kind,
            keys = store.len(),
            "shard policy rebuilt"
        );
    }

    /// Empties an already locked store.
    pub(crate) fn clear_locked(&self, store: &mut CacheStore<K, V>) {
        store.clear();
        self.sync_len(store);
    }

    fn sync_len(&self, store: &CacheStore<K, V>) {
        self.len.store(store.len(), Ordering::Release);
    }
}

/// Deadline for a wait of `timeout` starting now. `None` means wait
/// indefinitely: a zero timeout, or one too large for `Instant` to represent.
pub(crate) fn lock_deadline(timeout: Duration) -> Option<Instant> {
    if timeout.is_zero() {
        return None;
    }
    Instant::now().checked_add(timeout)
}

impl<K, V> std::fmt::Debug for Shard<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shard")
            .field("index", &self.index)
            .field("capacity", &self.capacity)
            .field("len", &self.len.load(Ordering::Relaxed))
            .finish()
    }
}
