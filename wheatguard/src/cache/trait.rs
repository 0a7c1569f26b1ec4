//! Cache trait definition for dependency injection.

use crate::cache::types::{CacheError, CacheKey};
use crate::cache::CacheStats;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by [`ValueCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Time-to-live cache for computed index values.
///
/// Absence is a normal outcome on the fetch path: `get` resolves to `None`
/// for missing and expired entries alike, and an unreachable external
/// backing reads as a miss. Operations are async so a shared network cache
/// can sit behind the same `Arc<dyn ValueCache>` as the in-process map.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use wheatguard::cache::{CacheKey, MemoryValueCache, ValueCache};
/// use wheatguard::coord::LocationKey;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cache = MemoryValueCache::new(1_000);
/// let key = CacheKey::new("sentinel", LocationKey::from_degrees(30.7333, 76.7794), None);
///
/// if cache.get(&key).await.is_none() {
///     cache.put(key.clone(), 0.612, Duration::from_secs(60)).await.ok();
/// }
/// assert_eq!(cache.get(&key).await, Some(0.612));
/// # }
/// ```
pub trait ValueCache: Send + Sync {
    /// Get a cached value if present and unexpired.
    fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<f64>>;

    /// Store a value that expires after `ttl`.
    fn put(&self, key: CacheKey, value: f64, ttl: Duration) -> CacheFuture<'_, Result<(), CacheError>>;

    /// Check if an unexpired entry exists.
    fn contains<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, bool>;

    /// Remove all entries.
    fn clear(&self) -> CacheFuture<'_, Result<(), CacheError>>;

    /// Snapshot of cache counters.
    fn stats(&self) -> CacheStats;

    /// Backend name for logging.
    fn backend(&self) -> &str;
}

/// Cache implementation that never stores anything.
///
/// Every lookup misses, so every fetch goes to the provider.
#[derive(Debug, Clone, Default)]
pub struct NoOpValueCache;

impl NoOpValueCache {
    pub fn new() -> Self {
        Self
    }
}

impl ValueCache for NoOpValueCache {
    fn get<'a>(&'a self, _key: &'a CacheKey) -> CacheFuture<'a, Option<f64>> {
        Box::pin(async { None })
    }

    fn put(&self, _key: CacheKey, _value: f64, _ttl: Duration) -> CacheFuture<'_, Result<(), CacheError>> {
        Box::pin(async { Ok(()) })
    }

    fn contains<'a>(&'a self, _key: &'a CacheKey) -> CacheFuture<'a, bool> {
        Box::pin(async { false })
    }

    fn clear(&self) -> CacheFuture<'_, Result<(), CacheError>> {
        Box::pin(async { Ok(()) })
    }

    fn stats(&self) -> CacheStats {
        CacheStats::new()
    }

    fn backend(&self) -> &str {
        "none"
    }
}
