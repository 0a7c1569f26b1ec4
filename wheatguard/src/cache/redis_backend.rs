//! Shared value cache backed by Redis.
//!
//! Several WheatGuard processes pointed at the same Redis instance share
//! fetched index values. Each entry is stored with `SET .. EX` so Redis
//! handles expiry. Every command is bounded by a timeout; a failed read is
//! logged and treated as a miss so the fetch path falls through to the
//! provider.

use crate::cache::types::{CacheError, CacheKey};
use crate::cache::{CacheFuture, CacheStats, ValueCache};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Default prefix put in front of every key.
pub const DEFAULT_REDIS_PREFIX: &str = "wheatguard";

/// Redis-backed [`ValueCache`].
pub struct RedisValueCache {
    connection: MultiplexedConnection,
    prefix: String,
    timeout: Duration,
    stats: Mutex<CacheStats>,
}

impl RedisValueCache {
    /// Opens a multiplexed connection to `url`.
    ///
    /// Fails when the URL is malformed or the server does not answer within
    /// `command_timeout`.
    pub async fn connect(url: &str, command_timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(|e| CacheError::Backend(e.to_string()))?;
        let connection = timeout(command_timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| CacheError::Backend("redis connect timeout".to_string()))?
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        debug!(url = url, "Connected to redis value cache");
        Ok(Self {
            connection,
            prefix: DEFAULT_REDIS_PREFIX.to_string(),
            timeout: command_timeout,
            stats: Mutex::new(CacheStats::new()),
        })
    }

    /// Use a different key prefix, e.g. to isolate test runs.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Full Redis key for a cache key.
    pub fn redis_key(&self, key: &CacheKey) -> String {
        redis_key(&self.prefix, key)
    }

    fn with_stats(&self, f: impl FnOnce(&mut CacheStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            f(&mut stats);
        }
    }

    async fn run<T, Fut>(&self, command: Fut) -> Result<T, CacheError>
    where
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        match timeout(self.timeout, command).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CacheError::Backend(e.to_string())),
            Err(_) => Err(CacheError::Backend("redis timeout".to_string())),
        }
    }

    async fn lookup(&self, key: &CacheKey) -> Option<f64> {
        let redis_key = self.redis_key(key);
        let mut conn = self.connection.clone();
        let result: Result<Option<f64>, CacheError> = self.run(conn.get(&redis_key)).await;
        match result {
            Ok(Some(value)) => {
                self.with_stats(|s| s.record_hit());
                Some(value)
            }
            Ok(None) => {
                self.with_stats(|s| s.record_miss(false));
                None
            }
            Err(e) => {
                warn!(key = %redis_key, error = %e, "Redis read failed, treating as miss");
                self.with_stats(|s| s.record_miss(false));
                None
            }
        }
    }

    async fn store(&self, key: CacheKey, value: f64, ttl: Duration) -> Result<(), CacheError> {
        let redis_key = self.redis_key(&key);
        let mut conn = self.connection.clone();
        let ttl_secs = ttl.as_secs().max(1);
        let _: () = self.run(conn.set_ex(&redis_key, value, ttl_secs)).await?;
        self.with_stats(|s| s.writes += 1);
        Ok(())
    }

    async fn holds(&self, key: &CacheKey) -> bool {
        let redis_key = self.redis_key(key);
        let mut conn = self.connection.clone();
        let result: Result<bool, CacheError> = self.run(conn.exists(&redis_key)).await;
        match result {
            Ok(exists) => exists,
            Err(e) => {
                warn!(key = %redis_key, error = %e, "Redis exists check failed");
                false
            }
        }
    }

    async fn remove_all(&self) -> Result<(), CacheError> {
        let pattern = format!("{}:*", self.prefix);
        let mut conn = self.connection.clone();
        let keys: Vec<String> = self.run(conn.keys(&pattern)).await?;
        if !keys.is_empty() {
            let _: () = self.run(conn.del(&keys)).await?;
        }
        debug!(removed = keys.len(), "Redis value cache cleared");
        Ok(())
    }
}

impl ValueCache for RedisValueCache {
    fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<f64>> {
        Box::pin(self.lookup(key))
    }

    fn put(&self, key: CacheKey, value: f64, ttl: Duration) -> CacheFuture<'_, Result<(), CacheError>> {
        Box::pin(self.store(key, value, ttl))
    }

    fn contains<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, bool> {
        Box::pin(self.holds(key))
    }

    fn clear(&self) -> CacheFuture<'_, Result<(), CacheError>> {
        Box::pin(self.remove_all())
    }

    fn stats(&self) -> CacheStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn backend(&self) -> &str {
        "redis"
    }
}

fn redis_key(prefix: &str, key: &CacheKey) -> String {
    format!("{}:{}", prefix, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LocationKey;

    #[test]
    fn test_redis_key_layout() {
        let key = CacheKey::new("modis", LocationKey::from_degrees(30.9, 75.85), None);
        assert_eq!(
            redis_key(DEFAULT_REDIS_PREFIX, &key),
            "wheatguard:ndvi:modis:30.9000:75.8500"
        );
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let result = RedisValueCache::connect("not a url", Duration::from_millis(100)).await;
        assert!(matches!(result, Err(CacheError::Backend(_))));
    }

    #[tokio::test]
    async fn test_connect_fails_when_unreachable() {
        let result =
            RedisValueCache::connect("redis://127.0.0.1:1/", Duration::from_millis(500)).await;
        assert!(matches!(result, Err(CacheError::Backend(_))));
    }

    #[tokio::test]
    #[ignore = "requires REDIS_URL and a running redis server"]
    async fn test_round_trip_against_live_server() {
        let Ok(url) = std::env::var("REDIS_URL") else {
            return;
        };
        let cache = RedisValueCache::connect(&url, Duration::from_secs(1))
            .await
            .unwrap()
            .with_prefix(format!("wheatguard-test-{}", std::process::id()));
        let key = CacheKey::new("modis", LocationKey::from_degrees(30.9, 75.85), None);

        assert_eq!(cache.get(&key).await, None);
        cache.put(key.clone(), 0.412, Duration::from_secs(30)).await.unwrap();
        assert_eq!(cache.get(&key).await, Some(0.412));
        assert!(cache.contains(&key).await);

        cache.clear().await.unwrap();
        assert!(!cache.contains(&key).await);
        assert_eq!(cache.stats().hits, 1);
    }
}
