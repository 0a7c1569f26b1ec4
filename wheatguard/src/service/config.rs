//! Service configuration types.

use crate::events::DEFAULT_EVENT_CAPACITY;
use crate::fetcher::FetcherConfig;
use crate::push::{DEFAULT_PUSH_CONCURRENCY, DEFAULT_PUSH_RADIUS_KM};
use crate::stress::ScanConfig;

/// Number of samples returned by a history query.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Radius of the nearby incident query in kilometres.
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;

/// Configuration for the WheatGuard service.
///
/// # Example
///
/// ```
/// use wheatguard::service::ServiceConfig;
/// use wheatguard::fetcher::FetcherConfig;
///
/// let config = ServiceConfig::builder()
///     .fetcher(FetcherConfig::default().with_max_concurrent(4))
///     .push_radius_km(2.5)
///     .build();
///
/// assert_eq!(config.fetcher().max_concurrent, 4);
/// assert_eq!(config.push_radius_km(), 2.5);
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Value TTL and polygon concurrency
    fetcher: FetcherConfig,
    /// Scanner history window and minimum samples
    scan: ScanConfig,
    /// Proximity radius for outbreak pushes
    push_radius_km: f64,
    /// Concurrent pushes per outbreak
    push_max_concurrent: usize,
    /// Broadcast channel capacity per subscriber
    event_capacity: usize,
    /// Samples returned by a history query
    history_limit: usize,
    /// Radius of the nearby incident query
    nearby_radius_km: f64,
}

impl ServiceConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::new()
    }

    pub fn fetcher(&self) -> &FetcherConfig {
        &self.fetcher
    }

    pub fn scan(&self) -> &ScanConfig {
        &self.scan
    }

    pub fn push_radius_km(&self) -> f64 {
        self.push_radius_km
    }

    pub fn push_max_concurrent(&self) -> usize {
        self.push_max_concurrent
    }

    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub fn nearby_radius_km(&self) -> f64 {
        self.nearby_radius_km
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfigBuilder::new().build()
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug, Clone)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ServiceConfig {
                fetcher: FetcherConfig::default(),
                scan: ScanConfig::default(),
                push_radius_km: DEFAULT_PUSH_RADIUS_KM,
                push_max_concurrent: DEFAULT_PUSH_CONCURRENCY,
                event_capacity: DEFAULT_EVENT_CAPACITY,
                history_limit: DEFAULT_HISTORY_LIMIT,
                nearby_radius_km: DEFAULT_NEARBY_RADIUS_KM,
            },
        }
    }

    pub fn fetcher(mut self, config: FetcherConfig) -> Self {
        self.config.fetcher = config;
        self
    }

    pub fn scan(mut self, config: ScanConfig) -> Self {
        self.config.scan = config;
        self
    }

    pub fn push_radius_km(mut self, radius_km: f64) -> Self {
        self.config.push_radius_km = radius_km;
        self
    }

    pub fn push_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.config.push_max_concurrent = max_concurrent;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    pub fn nearby_radius_km(mut self, radius_km: f64) -> Self {
        self.config.nearby_radius_km = radius_km;
        self
    }

    pub fn build(self) -> ServiceConfig {
        self.config
    }
}

impl Default for ServiceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
