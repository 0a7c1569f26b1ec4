//! Default values and constants for all configuration settings.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::cache::CacheBackend;

/// Default provider type.
pub const DEFAULT_PROVIDER_TYPE: &str = "modis";

/// Valid values for `provider.type`.
pub const VALID_PROVIDER_TYPES: &[&str] = &["sentinel", "modis"];

/// Default token margin (55 minutes).
pub const DEFAULT_TOKEN_MARGIN_SECS: u64 = crate::provider::DEFAULT_TOKEN_MARGIN_SECS;

/// Default HTTP timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = crate::provider::DEFAULT_TIMEOUT_SECS;

/// Default cache TTL (24 hours).
pub const DEFAULT_CACHE_TTL_SECS: u64 = crate::fetcher::DEFAULT_VALUE_TTL_SECS;

/// Default cache capacity in entries.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 100_000;

/// Default concurrent polygon vertex lookups.
pub const DEFAULT_FETCH_MAX_CONCURRENT: usize = crate::fetcher::DEFAULT_MAX_CONCURRENT;

/// Default daily scan time (02:00 local).
pub const DEFAULT_SCAN_HOUR: u32 = 2;
pub const DEFAULT_SCAN_MINUTE: u32 = 0;

/// Default push radius in kilometres.
pub const DEFAULT_PUSH_RADIUS_KM: f64 = crate::push::DEFAULT_PUSH_RADIUS_KM;

/// Default concurrent push sends.
pub const DEFAULT_PUSH_MAX_CONCURRENT: usize = crate::push::DEFAULT_PUSH_CONCURRENCY;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "wheatguard.log";

/// Default log file path (~/.wheatguard/wheatguard.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE_NAME)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            provider: ProviderSettings {
                provider_type: DEFAULT_PROVIDER_TYPE.to_string(),
                sentinel_client_id: None,
                sentinel_client_secret: None,
                token_margin_secs: DEFAULT_TOKEN_MARGIN_SECS,
            },
            http: HttpSettings {
                timeout: DEFAULT_HTTP_TIMEOUT_SECS,
            },
            cache: CacheSettings {
                backend: CacheBackend::Memory,
                ttl_secs: DEFAULT_CACHE_TTL_SECS,
                max_entries: DEFAULT_CACHE_MAX_ENTRIES,
                url: None,
            },
            fetch: FetchSettings {
                max_concurrent: DEFAULT_FETCH_MAX_CONCURRENT,
            },
            scheduler: SchedulerSettings {
                scan_hour: DEFAULT_SCAN_HOUR,
                scan_minute: DEFAULT_SCAN_MINUTE,
            },
            push: PushSettings {
                fcm_server_key: None,
                radius_km: DEFAULT_PUSH_RADIUS_KM,
                max_concurrent: DEFAULT_PUSH_MAX_CONCURRENT,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}
