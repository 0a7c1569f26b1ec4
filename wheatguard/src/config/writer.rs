//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use super::file::path_to_display;
use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let client_id = config.provider.sentinel_client_id.as_deref().unwrap_or("");
    let client_secret = config
        .provider
        .sentinel_client_secret
        .as_deref()
        .unwrap_or("");
    let fcm_server_key = config.push.fcm_server_key.as_deref().unwrap_or("");
    let cache_url = config.cache.url.as_deref().unwrap_or("");

    format!(
        r#"[provider]
; Vegetation index source:
;   modis    - MODIS MOD13Q1 16-day composites (free, no credentials)
;   sentinel - Sentinel-2 L2A via Copernicus Data Space (requires OAuth client)
type = {}
; Copernicus Data Space OAuth client (only required when type = sentinel)
sentinel_client_id = {}
sentinel_client_secret = {}
; Seconds after which a cached access token is replaced (default: 3300)
token_margin_secs = {}

[http]
; Timeout in seconds for each provider or push request (default: 30)
timeout = {}

[cache]
; Index value cache (default: memory):
;   memory - in-process map
;   redis  - shared Redis instance at url, memory is used if it is unreachable
;   none   - no caching
backend = {}
; Seconds a fetched value stays valid (default: 86400)
ttl_secs = {}
; Maximum number of cached values (default: 100000)
max_entries = {}
; Redis connection URL (e.g. redis://127.0.0.1:6379/0)
url = {}

[fetch]
; Concurrent vertex lookups when averaging a polygon (default: 16)
max_concurrent = {}

[scheduler]
; Local time of the daily stress scan (default: 02:00)
scan_hour = {}
scan_minute = {}

[push]
; FCM legacy server key; outbreak push notifications are disabled when empty
fcm_server_key = {}
; Devices within this many kilometres of an outbreak are notified (default: 5)
radius_km = {}
; Concurrent notification sends per outbreak (default: 8)
max_concurrent = {}

[logging]
; Log file path (default: ~/.wheatguard/wheatguard.log)
file = {}
"#,
        config.provider.provider_type,
        client_id,
        client_secret,
        config.provider.token_margin_secs,
        config.http.timeout,
        config.cache.backend,
        config.cache.ttl_secs,
        config.cache.max_entries,
        cache_url,
        config.fetch.max_concurrent,
        config.scheduler.scan_hour,
        config.scheduler.scan_minute,
        fcm_server_key,
        config.push.radius_km,
        config.push.max_concurrent,
        path_to_display(&config.logging.file),
    )
}
