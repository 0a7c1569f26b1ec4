//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use crate::cache::CacheBackend;
use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Index provider settings
    pub provider: ProviderSettings,
    /// HTTP client settings
    pub http: HttpSettings,
    /// Value cache settings
    pub cache: CacheSettings,
    /// Fetch settings
    pub fetch: FetchSettings,
    /// Scheduled scan settings
    pub scheduler: SchedulerSettings,
    /// Push notification settings
    pub push: PushSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Provider type: "sentinel" or "modis"
    pub provider_type: String,
    /// CDSE OAuth client id (only required for "sentinel")
    pub sentinel_client_id: Option<String>,
    /// CDSE OAuth client secret (only required for "sentinel")
    pub sentinel_client_secret: Option<String>,
    /// Age in seconds after which a cached token is replaced
    pub token_margin_secs: u64,
}

/// HTTP configuration.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Timeout in seconds for each individual request.
    pub timeout: u64,
}

/// Value cache configuration.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    /// Time-to-live for cached index values, in seconds
    pub ttl_secs: u64,
    /// Maximum number of cached values
    pub max_entries: usize,
    /// Redis connection URL, used when `backend` is redis
    pub url: Option<String>,
}

/// Fetch configuration.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Concurrent vertex lookups for a polygon average
    pub max_concurrent: usize,
}

/// Daily stress scan configuration.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Local hour of the daily scan (0-23)
    pub scan_hour: u32,
    /// Minute of the daily scan (0-59)
    pub scan_minute: u32,
}

/// Push notification configuration.
#[derive(Debug, Clone)]
pub struct PushSettings {
    /// FCM legacy server key; push is disabled without it
    pub fcm_server_key: Option<String>,
    /// Notification radius around an outbreak, in kilometres
    pub radius_km: f64,
    /// Concurrent sends per dispatch
    pub max_concurrent: usize,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
