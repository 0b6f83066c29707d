use std::ops::{Add, AddAssign};

/// Point-in-time view of cache counters.
///
/// Aggregated over shards by [`Cache::stats`](crate::cache::Cache::stats).
/// Not a consistent cut: counters are read one at a time while other threads
/// may keep operating.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,

    pub inserts: u64,
    pub updates: u64,
    pub removals: u64,
    // counted once per shard rebuilt
    pub policy_switches: u64,
}

impl CacheStats {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of `get` calls that hit, or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    pub fn merge(&mut self, other: &CacheStats) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.evictions += other.evictions;
        self.inserts += other.inserts;
        self.updates += other.updates;
        self.removals += other.removals;
        self.policy_switches += other.policy_switches;
    }
}

impl Add for CacheStats {
    type Output = CacheStats;

    fn add(mut self, rhs: CacheStats) -> CacheStats {
        self.merge(&rhs);
        self
    }
}

impl AddAssign for CacheStats {
    fn add_assign(&mut self, rhs: CacheStats) {
        self.merge(&rhs);
    }
}

impl std::iter::Sum for CacheStats {
    fn sum<I: Iterator<Item = CacheStats>>(iter: I) -> CacheStats {
        iter.fold(CacheStats::default(), Add::add)
    }
}
