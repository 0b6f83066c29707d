use std::sync::atomic::{AtomicU64, Ordering};

use crate::metrics::snapshot::CacheStats;

/// Per-shard operation counters.
///
/// Updated with relaxed atomic increments; each counter is exact, but a
/// snapshot taken while operations are running may mix values from slightly
/// different moments.
#[derive(Debug, Default)]
pub struct ShardCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    removals: AtomicU64,
    evictions: AtomicU64,
    policy_switches: AtomicU64,
}

impl ShardCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_policy_switch(&self) {
        self.policy_switches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            policy_switches: self.policy_switches.load(Ordering::Relaxed),
        }
    }
}
