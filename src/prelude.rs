pub use crate::builder::CacheBuilder;
pub use crate::cache::Cache;
pub use crate::error::CacheError;
pub use crate::lazy::LazyCache;
pub use crate::metrics::CacheStats;
pub use crate::policy::{EvictionPolicy, PolicyKind};
