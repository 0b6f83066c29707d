//! evictkit: a sharded in-memory key-value cache whose eviction policy
//! (LRU, FIFO or LFU) can be swapped while the cache is live.
//!
//! ```text
//!   builder ──► cache::Cache ──► cache::Shard ──► store::CacheStore ──► policy::AnyPolicy
//!                   │                 │                                     │
//!                   └─ metrics ◄──────┘                                     └─ ds (lists, buckets)
//! ```
//!
//! ```
//! use evictkit::prelude::*;
//!
//! let cache = CacheBuilder::new(2).policy(PolicyKind::Lfu).build::<&str, i32>()?;
//! cache.put("a", 1)?;
//! cache.put("b", 2)?;
//! cache.get(&"a")?;
//! cache.put("c", 3)?;
//! assert_eq!(cache.get(&"b")?, None);
//! assert_eq!(cache.stats().evictions, 1);
//! # Ok::<(), CacheError>(())
//! ```

pub mod builder;
pub mod cache;
pub mod ds;
pub mod error;
pub mod lazy;
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod store;

pub use crate::builder::CacheBuilder;
pub use crate::cache::Cache;
pub use crate::error::{CacheError, ConfigError, InvariantError};
pub use crate::lazy::LazyCache;
pub use crate::metrics::CacheStats;
pub use crate::policy::{AnyPolicy, EvictionPolicy, PolicyKind};
