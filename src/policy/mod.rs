//! Eviction policies.
//!
//! A policy never sees values. The store tells it which keys were inserted,
//! accessed and removed, and asks it for a victim when the store is full:
//!
//! ```text
//!   CacheStore                          EvictionPolicy
//!   ──────────                          ──────────────
//!   put(new key), full ──────────────►  select_victim()  → Some(&victim)
//!   map.remove(victim) ──────────────►  record_remove(&victim)
//!   map.insert(key)    ──────────────►  record_insert(key)
//!   get / put(existing) ─────────────►  record_access(&key)
//!   delete(key)        ──────────────►  record_remove(&key)
//! ```
//!
//! `select_victim` only peeks; removal always comes back through
//! `record_remove`, so the policy's key set and the store's key set move in
//! lock step.
//!
//! | Policy | Victim                               | `record_access` |
//! |--------|--------------------------------------|-----------------|
//! | LRU    | least recently inserted or accessed  | move to head    |
//! | FIFO   | earliest inserted                    | no-op           |
//! | LFU    | lowest frequency, oldest among ties  | frequency + 1   |
//!
//! The variant set is closed; [`AnyPolicy`] dispatches over it and is what
//! the store holds by default.

pub mod fifo;
pub mod lfu;
pub mod lru;

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

pub use fifo::FifoPolicy;
pub use lfu::LfuPolicy;
pub use lru::LruPolicy;

use crate::error::ConfigError;

/// Bookkeeping contract between a [`CacheStore`](crate::store::CacheStore)
/// and an eviction algorithm. Every method is amortized O(1).
pub trait EvictionPolicy<K> {
    fn kind(&self) -> PolicyKind;

    /// A key was added to the store.
    fn record_insert(&mut self, key: K);

    /// A stored key was read or overwritten.
    fn record_access(&mut self, key: &K);

    /// A key left the store (eviction or delete).
    fn record_remove(&mut self, key: &K);

    /// The key that should be evicted next, without removing it.
    fn select_victim(&self) -> Option<&K>;

    /// Number of tracked keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, key: &K) -> bool;

    fn clear(&mut self);
}

/// The closed set of eviction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolicyKind {
    #[default]
    Lru,
    Fifo,
    Lfu,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Lru, PolicyKind::Fifo, PolicyKind::Lfu];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lru => "lru",
            Self::Fifo => "fifo",
            Self::Lfu => "lfu",
        }
    }

    pub(crate) fn as_u8(self) -> u8 {
        match self {
            Self::Lru => 0,
            Self::Fifo => 1,
            Self::Lfu => 2,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Fifo,
            2 => Self::Lfu,
            _ => Self::Lru,
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "fifo" => Ok(Self::Fifo),
            "lfu" => Ok(Self::Lfu),
            other => Err(ConfigError::new(format!(
                "unknown eviction policy `{other}` (expected lru, fifo or lfu)"
            ))),
        }
    }
}

/// One of the built-in policies, selected at runtime.
#[derive(Debug)]
pub enum AnyPolicy<K> {
    Lru(LruPolicy<K>),
    Fifo(FifoPolicy<K>),
    Lfu(LfuPolicy<K>),
}

impl<K> AnyPolicy<K>
where
    K: Eq + Hash + Clone,
{
    /// Builds an empty policy of `kind`, pre-sized for `capacity` keys.
    pub fn new(kind: PolicyKind, capacity: usize) -> Self {
        match kind {
            PolicyKind::Lru => Self::Lru(LruPolicy::with_capacity(capacity)),
            PolicyKind::Fifo => Self::Fifo(FifoPolicy::with_capacity(capacity)),
            PolicyKind::Lfu => Self::Lfu(LfuPolicy::with_capacity(capacity)),
        }
    }
}

impl<K> EvictionPolicy<K> for AnyPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn kind(&self) -> PolicyKind {
        match self {
            Self::Lru(p) => p.kind(),
            Self::Fifo(p) => p.kind(),
            Self::Lfu(p) => p.kind(),
        }
    }

    fn record_insert(&mut self, key: K) {
        match self {
            Self::Lru(p) => p.record_insert(key),
            Self::Fifo(p) => p.record_insert(key),
            Self::Lfu(p) => p.record_insert(key),
        }
    }

    fn record_access(&mut self, key: &K) {
        match self {
            Self::Lru(p) => p.record_access(key),
            Self::Fifo(p) => p.record_access(key),
            Self::Lfu(p) => p.record_access(key),
        }
    }

    fn record_remove(&mut self, key: &K) {
        match self {
            Self::Lru(p) => p.record_remove(key),
            Self::Fifo(p) => p.record_remove(key),
            Self::Lfu(p) => p.record_remove(key),
        }
    }

    fn select_victim(&self) -> Option<&K> {
        match self {
            Self::Lru(p) => p.select_victim(),
            Self::Fifo(p) => p.select_victim(),
            Self::Lfu(p) => p.select_victim(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Lru(p) => p.len(),
            Self::Fifo(p) => p.len(),
            Self::Lfu(p) => p.len(),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match self {
            Self::Lru(p) => p.contains(key),
            Self::Fifo(p) => p.contains(key),
            Self::Lfu(p) => p.contains(key),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Lru(p) => p.clear(),
            Self::Fifo(p) => p.clear(),
            Self::Lfu(p) => p.clear(),
        }
    }
}
