//! Build-once cache handle.
//!
//! [`LazyCache`] defers construction until the first [`get`](LazyCache::get)
//! and hands every caller the same `Arc<Cache>`. It is an ordinary value:
//! the owner decides its scope and passes handles down, so independent
//! instances (one per test, say) never share state.
//!
//! ```
//! use std::sync::Arc;
//!
//! use evictkit::builder::CacheBuilder;
//! use evictkit::lazy::LazyCache;
//!
//! let lazy: LazyCache<u64, u64> = LazyCache::new(CacheBuilder::new(16));
//! assert!(!lazy.is_initialized());
//!
//! let a = lazy.get()?;
//! let b = lazy.get()?;
//! assert!(Arc::ptr_eq(&a, &b));
//! # Ok::<(), evictkit::error::CacheError>(())
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::builder::CacheBuilder;
use crate::cache::Cache;
use crate::error::CacheError;

pub struct LazyCache<K, V> {
    builder: CacheBuilder,
    cell: OnceCell<Arc<Cache<K, V>>>,
}

impl<K, V> LazyCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(builder: CacheBuilder) -> Self {
        Self {
            builder,
            cell: OnceCell::new(),
        }
    }

    /// Returns the shared cache, building it on first use.
    ///
    /// Concurrent first callers block until one of them finishes building.
    /// A failed build stores nothing, so the error goes to that caller and
    /// the next call tries again.
    pub fn get(&self) -> Result<Arc<Cache<K, V>>, CacheError> {
        self.cell
            .get_or_try_init(|| {
                let cache = self.builder.build()?;
                tracing::debug!(capacity = self.builder.capacity(), "lazy cache initialized");
                Ok(Arc::new(cache))
            })
            .cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn builder(&self) -> &CacheBuilder {
        &self.builder
    }

    /// Consumes the wrapper, returning the cache if it was ever built.
    pub fn into_inner(self) -> Option<Arc<Cache<K, V>>> {
        self.cell.into_inner()
    }
}

impl<K, V> fmt::Debug for LazyCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCache")
            .field("builder", &self.builder)
            .field("initialized", &self.cell.get().is_some())
            .finish()
    }
}
