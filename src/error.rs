//! Error types for the evictkit library.
//!
//! ## Key Components
//!
//! - [`CacheError`]: Everything a [`Cache`](crate::cache::Cache) operation can
//!   surface to its caller.
//! - [`InvariantError`]: Internal bookkeeping went out of sync (policy and
//!   store disagree). Always a bug; never retried.
//! - [`ConfigError`]: A configuration value could not be parsed.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::builder::CacheBuilder;
//! use evictkit::error::CacheError;
//!
//! let err = CacheBuilder::new(0).build::<u64, u64>().unwrap_err();
//! assert!(matches!(err, CacheError::CapacityInvalid { .. }));
//! assert!(!err.is_retryable());
//! ```

use std::fmt;
use std::time::Duration;

/// Errors returned by cache construction and cache operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// Capacity or shard count rejected at construction.
    #[error(
        "invalid capacity: capacity {capacity} with {shard_count} shard(s) \
         (need at least one shard, and every shard needs at least one slot)"
    )]
    CapacityInvalid { capacity: usize, shard_count: usize },

    /// A shard lock was not acquired within the configured timeout.
    #[error("timed out after {timeout:?} waiting for shard {shard} lock")]
    LockTimeout { shard: usize, timeout: Duration },

    /// Another policy switch held the switch lock for the whole timeout.
    #[error("policy switch already in progress (waited {timeout:?})")]
    PolicySwitchInProgress { timeout: Duration },

    /// Policy bookkeeping disagrees with the store. The operation was aborted.
    #[error("cache invariant violated: {0}")]
    Invariant(#[from] InvariantError),
}

impl CacheError {
    /// `true` for lock contention errors, which a caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LockTimeout { .. } | Self::PolicySwitchInProgress { .. }
        )
    }

    /// `true` when the error indicates a bug in eviction bookkeeping.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`CacheStore::put`](crate::store::CacheStore::put) when the
/// policy has no victim for a full store, and by the `check_invariants`
/// methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

/// Error returned when a configuration value is not recognized.
///
/// ```
/// use evictkit::policy::PolicyKind;
///
/// let err = "arc".parse::<PolicyKind>().unwrap_err();
/// assert!(err.to_string().contains("arc"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}
