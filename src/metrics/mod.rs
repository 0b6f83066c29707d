//! Hit/miss/eviction accounting.
//!
//! Recording and reading are split: each shard owns [`ShardCounters`] that
//! operations bump lock-free, and readers fold them into a [`CacheStats`]
//! snapshot. Counting never takes a shard lock.

pub mod counters;
pub mod snapshot;

pub use counters::ShardCounters;
pub use snapshot::CacheStats;
