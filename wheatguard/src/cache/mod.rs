//! Value cache for computed vegetation index lookups.
//!
//! Provides a time-to-live key-value store with pluggable backing. The
//! fetcher receives an `Arc<dyn ValueCache>` at construction, so the backing
//! (in-process map, shared Redis instance, or no-op) is chosen once per
//! process by the service wiring.

mod memory;
mod redis_backend;
mod stats;
mod r#trait;
mod types;

pub use memory::MemoryValueCache;
pub use r#trait::{CacheFuture, NoOpValueCache, ValueCache};
pub use redis_backend::{RedisValueCache, DEFAULT_REDIS_PREFIX};
pub use stats::CacheStats;
pub use types::{CacheBackend, CacheConfig, CacheError, CacheKey};

use std::sync::Arc;
use tracing::warn;

/// Creates the cache backing selected by `config`.
///
/// The redis backend falls back to the memory backend when no URL is
/// configured or the server cannot be reached.
pub async fn create_value_cache(config: &CacheConfig) -> Arc<dyn ValueCache> {
    match config.backend {
        CacheBackend::Memory => Arc::new(MemoryValueCache::new(config.max_entries)),
        CacheBackend::None => Arc::new(NoOpValueCache::new()),
        CacheBackend::Redis => {
            let Some(url) = config.url.as_deref() else {
                warn!("Redis cache selected without cache.url, using memory cache");
                return Arc::new(MemoryValueCache::new(config.max_entries));
            };
            match RedisValueCache::connect(url, config.timeout).await {
                Ok(cache) => Arc::new(cache),
                Err(e) => {
                    warn!(error = %e, "Redis cache unavailable, using memory cache");
                    Arc::new(MemoryValueCache::new(config.max_entries))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_create_value_cache_backends() {
        let memory = create_value_cache(&CacheConfig::default()).await;
        assert_eq!(memory.backend(), "memory");

        let none =
            create_value_cache(&CacheConfig::default().with_backend(CacheBackend::None)).await;
        assert_eq!(none.backend(), "none");
    }

    #[tokio::test]
    async fn test_redis_without_url_falls_back_to_memory() {
        let config = CacheConfig::default().with_backend(CacheBackend::Redis);
        assert_eq!(create_value_cache(&config).await.backend(), "memory");
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_memory() {
        let config = CacheConfig::default()
            .with_backend(CacheBackend::Redis)
            .with_url("redis://127.0.0.1:1/")
            .with_timeout(Duration::from_millis(500));
        let cache = create_value_cache(&config).await;

        assert_eq!(cache.backend(), "memory");
    }
}
