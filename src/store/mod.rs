//! Storage layer: entries and the policy-driven store that owns them.
//!
//! Stores focus on key/value ownership and capacity accounting, while
//! policies decide eviction order. This keeps policy logic independent of
//! how values are held.

pub mod cache_store;
pub mod entry;

pub use cache_store::{CacheStore, PutOutcome};
pub use entry::Entry;
