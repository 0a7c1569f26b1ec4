//! Cache-then-compute NDVI lookups.
//!
//! [`IndexFetcher`] sits between callers and an [`IndexProvider`]. Every
//! lookup first consults the shared [`ValueCache`] under a key built from
//! the provider name, the coordinate rounded to four decimals, and the
//! resolved date. On a miss the provider is called, the value rounded to
//! three decimals, and written through with the configured TTL.
//!
//! Provider failures never escape [`IndexFetcher::fetch`]: they are logged
//! and reported as "not available".

mod polygon;

pub use polygon::{distinct_vertices, PolygonAverage};

use crate::cache::{CacheKey, ValueCache};
use crate::coord::{round_to, Coordinate};
use crate::provider::{IndexProvider, ProviderError};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Decimal places kept for index values.
pub const VALUE_PRECISION: i32 = 3;

/// Default TTL for cached values (24 hours).
pub const DEFAULT_VALUE_TTL_SECS: u64 = 86_400;

/// Default number of vertex lookups in flight for a polygon.
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

/// Tuning for an [`IndexFetcher`].
#[derive(Debug, Clone, Copy)]
pub struct FetcherConfig {
    /// How long a fetched value stays in the cache
    pub ttl: Duration,
    /// Upper bound on concurrent vertex lookups in a polygon fetch
    pub max_concurrent: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_VALUE_TTL_SECS),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

impl FetcherConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }
}

/// Memoizing front for an index provider.
pub struct IndexFetcher<P: IndexProvider> {
    provider: P,
    cache: Arc<dyn ValueCache>,
    config: FetcherConfig,
}

impl<P: IndexProvider> IndexFetcher<P> {
    /// Creates a fetcher over a provider and an injected cache.
    pub fn new(provider: P, cache: Arc<dyn ValueCache>, config: FetcherConfig) -> Self {
        Self {
            provider,
            cache,
            config,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &Arc<dyn ValueCache> {
        &self.cache
    }

    /// The date the provider will actually serve for a requested date.
    pub fn resolve_date(&self, requested: Option<NaiveDate>) -> Option<NaiveDate> {
        self.provider.resolve_date(requested)
    }

    /// Cache key for a coordinate and requested date.
    pub fn cache_key(&self, coord: Coordinate, date: Option<NaiveDate>) -> CacheKey {
        CacheKey::new(
            self.provider.name(),
            coord.location_key(),
            self.resolve_date(date),
        )
    }

    /// Fetches the index value at a coordinate.
    ///
    /// Returns `None` when the value is not available for any reason:
    /// provider unreachable, credential refresh failed, or no valid pixel.
    pub async fn fetch(&self, coord: Coordinate, date: Option<NaiveDate>) -> Option<f64> {
        match self.try_fetch(coord, date).await {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    coord = %coord,
                    error = %e,
                    "Index lookup failed"
                );
                None
            }
        }
    }

    /// Like [`fetch`](Self::fetch) but surfaces provider errors.
    pub async fn try_fetch(
        &self,
        coord: Coordinate,
        date: Option<NaiveDate>,
    ) -> Result<Option<f64>, ProviderError> {
        let key = self.cache_key(coord, date);
        if let Some(value) = self.cache.get(&key).await {
            debug!(key = %key, value = value, "Index cache hit");
            return Ok(Some(value));
        }

        let raw = self.provider.lookup(coord, key.date).await?;
        let Some(raw) = raw else {
            debug!(key = %key, "Provider has no valid value");
            return Ok(None);
        };

        let value = round_to(raw, VALUE_PRECISION);
        if let Err(e) = self.cache.put(key.clone(), value, self.config.ttl).await {
            warn!(key = %key, error = %e, "Failed to cache index value");
        }
        Ok(Some(value))
    }

    /// Averages the index over the vertices of a polygon ring.
    ///
    /// Each distinct vertex is fetched once, concurrently, bounded by
    /// `max_concurrent`. The mean is taken over every ring position with a
    /// value, so a repeated closing vertex is weighted twice. If no vertex is
    /// available the result is [`PolygonAverage::NoData`].
    pub async fn fetch_polygon(
        &self,
        ring: &[Coordinate],
        date: Option<NaiveDate>,
    ) -> PolygonAverage {
        let vertices = distinct_vertices(ring);
        let Some(&representative) = vertices.first() else {
            return PolygonAverage::NoData;
        };

        let fetched: HashMap<_, _> = stream::iter(vertices.iter().copied())
            .map(|coord| async move { (coord.location_key(), self.fetch(coord, date).await) })
            .buffer_unordered(self.config.max_concurrent.max(1))
            .collect()
            .await;
        let values = polygon::ring_values(ring, &fetched);

        debug!(
            positions = ring.len(),
            distinct = vertices.len(),
            available = values.len(),
            "Polygon fetch complete"
        );
        PolygonAverage::from_values(&values, representative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryValueCache;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider answering from a fixed table keyed by latitude.
    #[derive(Default)]
    struct TableProvider {
        values: Mutex<HashMap<i64, Result<Option<f64>, ProviderError>>>,
        calls: AtomicUsize,
    }

    impl TableProvider {
        fn with(self, lat: f64, result: Result<Option<f64>, ProviderError>) -> Self {
            self.values
                .lock()
                .unwrap()
                .insert((lat * 10_000.0).round() as i64, result);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl IndexProvider for TableProvider {
        async fn lookup(
            &self,
            coord: Coordinate,
            _date: Option<NaiveDate>,
        ) -> Result<Option<f64>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.values
                .lock()
                .unwrap()
                .get(&((coord.lat * 10_000.0).round() as i64))
                .cloned()
                .unwrap_or(Ok(None))
        }

        fn name(&self) -> &str {
            "table"
        }
    }

    fn coord(lat: f64) -> Coordinate {
        Coordinate::new(lat, 76.7794).unwrap()
    }

    fn fetcher(provider: TableProvider, ttl_secs: u64) -> IndexFetcher<TableProvider> {
        IndexFetcher::new(
            provider,
            Arc::new(MemoryValueCache::new(1000)),
            FetcherConfig::default().with_ttl(Duration::from_secs(ttl_secs)),
        )
    }

    #[tokio::test]
    async fn test_fetch_rounds_and_caches() {
        let fetcher = fetcher(TableProvider::default().with(30.7333, Ok(Some(0.61234))), 60);

        assert_eq!(fetcher.fetch(coord(30.7333), None).await, Some(0.612));
        let key = fetcher.cache_key(coord(30.7333), None);
        assert_eq!(fetcher.cache().get(&key).await, Some(0.612));
    }

    #[tokio::test]
    async fn test_nearby_coordinates_share_cache_entry() {
        let fetcher = fetcher(TableProvider::default().with(30.7333, Ok(Some(0.5))), 60);

        fetcher.fetch(coord(30.73331), None).await;
        fetcher.fetch(coord(30.73334), None).await;

        assert_eq!(fetcher.provider().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_controls_network_calls() {
        let fetcher = fetcher(TableProvider::default().with(30.7333, Ok(Some(0.5))), 60);
        let point = coord(30.7333);

        fetcher.fetch(point, None).await;
        assert_eq!(fetcher.provider().calls(), 1);

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(fetcher.fetch(point, None).await, Some(0.5));
        assert_eq!(fetcher.provider().calls(), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(fetcher.fetch(point, None).await, Some(0.5));
        assert_eq!(fetcher.provider().calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_available_and_not_cached() {
        let fetcher = fetcher(
            TableProvider::default().with(
                30.7333,
                Err(ProviderError::Timeout("process request".into())),
            ),
            60,
        );
        let point = coord(30.7333);

        assert_eq!(fetcher.fetch(point, None).await, None);
        assert_eq!(fetcher.fetch(point, None).await, None);
        assert_eq!(fetcher.provider().calls(), 2);
        assert!(fetcher.try_fetch(point, None).await.is_err());
    }

    #[tokio::test]
    async fn test_no_value_is_not_cached() {
        let fetcher = fetcher(TableProvider::default(), 60);
        let point = coord(10.0);

        assert_eq!(fetcher.fetch(point, None).await, None);
        assert!(!fetcher.cache().contains(&fetcher.cache_key(point, None)).await);
    }

    #[tokio::test]
    async fn test_polygon_average_skips_unavailable() {
        let provider = TableProvider::default()
            .with(30.0, Ok(Some(0.5)))
            .with(30.001, Ok(Some(0.3)))
            .with(30.002, Err(ProviderError::HttpError("reset".into())));
        let fetcher = fetcher(provider, 60);

        let ring = [coord(30.0), coord(30.001), coord(30.002), coord(30.0)];
        let result = fetcher.fetch_polygon(&ring, None).await;

        assert_eq!(
            result,
            PolygonAverage::Value {
                average: 0.433,
                vertices_used: 3,
                representative: coord(30.0),
            }
        );
        assert_eq!(fetcher.provider().calls(), 3);
    }

    #[tokio::test]
    async fn test_polygon_mean_weights_closing_vertex() {
        let provider = TableProvider::default()
            .with(30.0, Ok(Some(0.5)))
            .with(30.001, Ok(Some(0.3)))
            .with(30.002, Ok(Some(0.1)));
        let fetcher = fetcher(provider, 60);

        let ring = [coord(30.0), coord(30.001), coord(30.002), coord(30.0)];
        let result = fetcher.fetch_polygon(&ring, None).await;

        assert_eq!(result.average(), Some(0.35));
        assert_eq!(fetcher.provider().calls(), 3);
    }

    #[tokio::test]
    async fn test_polygon_without_values_is_no_data() {
        let fetcher = fetcher(TableProvider::default(), 60);
        let ring = [coord(1.0), coord(2.0), coord(3.0)];

        assert_eq!(fetcher.fetch_polygon(&ring, None).await, PolygonAverage::NoData);
        assert_eq!(fetcher.fetch_polygon(&[], None).await, PolygonAverage::NoData);
    }
}
