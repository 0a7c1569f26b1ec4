//! Core types for the value cache.

use crate::coord::LocationKey;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Cache key identifying one memoized index value.
///
/// Composed of the provider name, the rounded location and, for providers
/// that resolve a specific composite date, that date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Provider name (e.g., "sentinel", "modis")
    pub provider: String,
    /// Rounded location
    pub location: LocationKey,
    /// Composite date the value belongs to, if the provider is date-aware
    pub date: Option<NaiveDate>,
}

impl CacheKey {
    /// Create a new cache key.
    pub fn new(provider: impl Into<String>, location: LocationKey, date: Option<NaiveDate>) -> Self {
        Self {
            provider: provider.into(),
            location,
            date,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) => write!(f, "ndvi:{}:{}:{}", self.provider, self.location, date),
            None => write!(f, "ndvi:{}:{}", self.provider, self.location),
        }
    }
}

/// Cache-related errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to acquire lock
    #[error("Failed to acquire cache lock")]
    LockError,

    /// Backing store rejected the operation
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Which backing store the value cache uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    /// In-process map with TTL expiry
    #[default]
    Memory,
    /// Shared Redis instance, falling back to memory when unreachable
    Redis,
    /// Never stores anything
    None,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            "none" | "off" => Ok(Self::None),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Redis => write!(f, "redis"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Value cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Backing store
    pub backend: CacheBackend,
    /// Maximum number of entries held by the memory backend
    pub max_entries: usize,
    /// Connection URL for the redis backend (e.g. `redis://127.0.0.1:6379/0`)
    pub url: Option<String>,
    /// Per-command timeout for the redis backend
    pub timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            max_entries: 100_000,
            url: None,
            timeout: Duration::from_millis(500),
        }
    }
}

impl CacheConfig {
    /// Set the redis connection URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the redis command timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of entries.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set the backing store.
    pub fn with_backend(mut self, backend: CacheBackend) -> Self {
        self.backend = backend;
        self
    }
}
