//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::str::FromStr;

use super::defaults::VALID_PROVIDER_TYPES;
use super::file::{expand_tilde, ConfigFileError};
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [provider] section
    if let Some(section) = ini.section(Some("provider")) {
        if let Some(v) = section.get("type") {
            let v = v.trim().to_lowercase();
            if !VALID_PROVIDER_TYPES.contains(&v.as_str()) {
                return Err(invalid(
                    "provider",
                    "type",
                    &v,
                    &format!("must be one of: {}", VALID_PROVIDER_TYPES.join(", ")),
                ));
            }
            config.provider.provider_type = v;
        }
        if let Some(v) = section.get("sentinel_client_id") {
            config.provider.sentinel_client_id = optional_string(v);
        }
        if let Some(v) = section.get("sentinel_client_secret") {
            config.provider.sentinel_client_secret = optional_string(v);
        }
        if let Some(v) = section.get("token_margin_secs") {
            config.provider.token_margin_secs =
                parse_positive("provider", "token_margin_secs", v)?;
        }
    }

    // [http] section
    if let Some(section) = ini.section(Some("http")) {
        if let Some(v) = section.get("timeout") {
            config.http.timeout = parse_positive("http", "timeout", v)?;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("backend") {
            config.cache.backend = v
                .parse()
                .map_err(|_| invalid("cache", "backend", v, "must be one of: memory, redis, none"))?;
        }
        if let Some(v) = section.get("ttl_secs") {
            config.cache.ttl_secs = parse_positive("cache", "ttl_secs", v)?;
        }
        if let Some(v) = section.get("max_entries") {
            config.cache.max_entries = parse_positive("cache", "max_entries", v)?;
        }
        if let Some(v) = section.get("url") {
            config.cache.url = optional_string(v);
        }
    }

    // [fetch] section
    if let Some(section) = ini.section(Some("fetch")) {
        if let Some(v) = section.get("max_concurrent") {
            config.fetch.max_concurrent = parse_positive("fetch", "max_concurrent", v)?;
        }
    }

    // [scheduler] section
    if let Some(section) = ini.section(Some("scheduler")) {
        if let Some(v) = section.get("scan_hour") {
            config.scheduler.scan_hour = parse_bounded("scheduler", "scan_hour", v, 23)?;
        }
        if let Some(v) = section.get("scan_minute") {
            config.scheduler.scan_minute = parse_bounded("scheduler", "scan_minute", v, 59)?;
        }
    }

    // [push] section
    if let Some(section) = ini.section(Some("push")) {
        if let Some(v) = section.get("fcm_server_key") {
            config.push.fcm_server_key = optional_string(v);
        }
        if let Some(v) = section.get("radius_km") {
            let radius: f64 = v
                .trim()
                .parse()
                .map_err(|_| invalid("push", "radius_km", v, "must be a number (kilometres)"))?;
            if !radius.is_finite() || radius <= 0.0 {
                return Err(invalid("push", "radius_km", v, "must be greater than zero"));
            }
            config.push.radius_km = radius;
        }
        if let Some(v) = section.get("max_concurrent") {
            config.push.max_concurrent = parse_positive("push", "max_concurrent", v)?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses an integer that must be greater than zero.
fn parse_positive<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(invalid(section, key, value, "must be a positive integer")),
    }
}

fn parse_bounded(section: &str, key: &str, value: &str, max: u32) -> Result<u32, ConfigFileError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n <= max => Ok(n),
        _ => Err(invalid(
            section,
            key,
            value,
            &format!("must be an integer from 0 to {}", max),
        )),
    }
}

/// Convert an empty or whitespace value to None.
pub(super) fn optional_string(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
