//! Configuration key access and validation.
//!
//! This module provides a type-safe interface for getting and setting
//! configuration values by key name, with validation via the Specification Pattern.

use std::str::FromStr;
use thiserror::Error;

use super::defaults::VALID_PROVIDER_TYPES;
use super::file::{expand_tilde, path_to_display};
use super::settings::ConfigFile;
use super::parser::optional_string;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
///
/// Each key maps to a specific field in [`ConfigFile`] and knows how to
/// get and set its value with proper validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Provider settings
    ProviderType,
    ProviderSentinelClientId,
    ProviderSentinelClientSecret,
    ProviderTokenMarginSecs,

    // HTTP settings
    HttpTimeout,

    // Cache settings
    CacheBackend,
    CacheTtlSecs,
    CacheMaxEntries,
    CacheUrl,

    // Fetch settings
    FetchMaxConcurrent,

    // Scheduler settings
    SchedulerScanHour,
    SchedulerScanMinute,

    // Push settings
    PushFcmServerKey,
    PushRadiusKm,
    PushMaxConcurrent,

    // Logging settings
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "push.radius_km").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ProviderType => "provider.type",
            ConfigKey::ProviderSentinelClientId => "provider.sentinel_client_id",
            ConfigKey::ProviderSentinelClientSecret => "provider.sentinel_client_secret",
            ConfigKey::ProviderTokenMarginSecs => "provider.token_margin_secs",
            ConfigKey::HttpTimeout => "http.timeout",
            ConfigKey::CacheBackend => "cache.backend",
            ConfigKey::CacheTtlSecs => "cache.ttl_secs",
            ConfigKey::CacheMaxEntries => "cache.max_entries",
            ConfigKey::CacheUrl => "cache.url",
            ConfigKey::FetchMaxConcurrent => "fetch.max_concurrent",
            ConfigKey::SchedulerScanHour => "scheduler.scan_hour",
            ConfigKey::SchedulerScanMinute => "scheduler.scan_minute",
            ConfigKey::PushFcmServerKey => "push.fcm_server_key",
            ConfigKey::PushRadiusKm => "push.radius_km",
            ConfigKey::PushMaxConcurrent => "push.max_concurrent",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "push").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "radius_km").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Whether the value is a credential that should be masked when displayed.
    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            ConfigKey::ProviderSentinelClientSecret
                | ConfigKey::PushFcmServerKey
                | ConfigKey::CacheUrl
        )
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ProviderType => config.provider.provider_type.clone(),
            ConfigKey::ProviderSentinelClientId => config
                .provider
                .sentinel_client_id
                .clone()
                .unwrap_or_default(),
            ConfigKey::ProviderSentinelClientSecret => config
                .provider
                .sentinel_client_secret
                .clone()
                .unwrap_or_default(),
            ConfigKey::ProviderTokenMarginSecs => config.provider.token_margin_secs.to_string(),
            ConfigKey::HttpTimeout => config.http.timeout.to_string(),
            ConfigKey::CacheBackend => config.cache.backend.to_string(),
            ConfigKey::CacheTtlSecs => config.cache.ttl_secs.to_string(),
            ConfigKey::CacheMaxEntries => config.cache.max_entries.to_string(),
            ConfigKey::CacheUrl => config.cache.url.clone().unwrap_or_default(),
            ConfigKey::FetchMaxConcurrent => config.fetch.max_concurrent.to_string(),
            ConfigKey::SchedulerScanHour => config.scheduler.scan_hour.to_string(),
            ConfigKey::SchedulerScanMinute => config.scheduler.scan_minute.to_string(),
            ConfigKey::PushFcmServerKey => config.push.fcm_server_key.clone().unwrap_or_default(),
            ConfigKey::PushRadiusKm => config.push.radius_km.to_string(),
            ConfigKey::PushMaxConcurrent => config.push.max_concurrent.to_string(),
            ConfigKey::LoggingFile => path_to_display(&config.logging.file),
        }
    }

    /// Set the value in a config file.
    ///
    /// Validates the value according to the key's specification before setting.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.validate(value)?;
        self.apply(config, value.trim())
    }

    fn apply(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        match self {
            ConfigKey::ProviderType => {
                config.provider.provider_type = value.to_lowercase();
            }
            ConfigKey::ProviderSentinelClientId => {
                config.provider.sentinel_client_id = optional_string(value);
            }
            ConfigKey::ProviderSentinelClientSecret => {
                config.provider.sentinel_client_secret = optional_string(value);
            }
            ConfigKey::ProviderTokenMarginSecs => {
                config.provider.token_margin_secs = self.parse(value)?;
            }
            ConfigKey::HttpTimeout => {
                config.http.timeout = self.parse(value)?;
            }
            ConfigKey::CacheBackend => {
                config.cache.backend = self.parse(&value.to_lowercase())?;
            }
            ConfigKey::CacheTtlSecs => {
                config.cache.ttl_secs = self.parse(value)?;
            }
            ConfigKey::CacheMaxEntries => {
                config.cache.max_entries = self.parse(value)?;
            }
            ConfigKey::CacheUrl => {
                config.cache.url = optional_string(value);
            }
            ConfigKey::FetchMaxConcurrent => {
                config.fetch.max_concurrent = self.parse(value)?;
            }
            ConfigKey::SchedulerScanHour => {
                config.scheduler.scan_hour = self.parse(value)?;
            }
            ConfigKey::SchedulerScanMinute => {
                config.scheduler.scan_minute = self.parse(value)?;
            }
            ConfigKey::PushFcmServerKey => {
                config.push.fcm_server_key = optional_string(value);
            }
            ConfigKey::PushRadiusKm => {
                config.push.radius_km = self.parse(value)?;
            }
            ConfigKey::PushMaxConcurrent => {
                config.push.max_concurrent = self.parse(value)?;
            }
            ConfigKey::LoggingFile => {
                config.logging.file = expand_tilde(value);
            }
        }
        Ok(())
    }

    fn parse<T: FromStr>(&self, value: &str) -> Result<T, ConfigKeyError> {
        value.parse().map_err(|_| ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: format!("cannot parse '{}'", value),
        })
    }

    /// Validate a value according to this key's specification.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value.trim())
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    /// Get the validation specification for this key.
    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::ProviderType => Box::new(OneOfSpec::new(VALID_PROVIDER_TYPES)),
            ConfigKey::ProviderSentinelClientId => Box::new(AnyStringSpec),
            ConfigKey::ProviderSentinelClientSecret => Box::new(AnyStringSpec),
            ConfigKey::ProviderTokenMarginSecs => Box::new(PositiveIntegerSpec),
            ConfigKey::HttpTimeout => Box::new(PositiveIntegerSpec),
            ConfigKey::CacheBackend => Box::new(OneOfSpec::new(&["memory", "redis", "none"])),
            ConfigKey::CacheTtlSecs => Box::new(PositiveIntegerSpec),
            ConfigKey::CacheMaxEntries => Box::new(PositiveIntegerSpec),
            ConfigKey::CacheUrl => Box::new(AnyStringSpec),
            ConfigKey::FetchMaxConcurrent => Box::new(PositiveIntegerSpec),
            ConfigKey::SchedulerScanHour => Box::new(RangeSpec::new(0, 23)),
            ConfigKey::SchedulerScanMinute => Box::new(RangeSpec::new(0, 59)),
            ConfigKey::PushFcmServerKey => Box::new(AnyStringSpec),
            ConfigKey::PushRadiusKm => Box::new(PositiveNumberSpec),
            ConfigKey::PushMaxConcurrent => Box::new(PositiveIntegerSpec),
            ConfigKey::LoggingFile => Box::new(PathSpec),
        }
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ProviderType,
            ConfigKey::ProviderSentinelClientId,
            ConfigKey::ProviderSentinelClientSecret,
            ConfigKey::ProviderTokenMarginSecs,
            ConfigKey::HttpTimeout,
            ConfigKey::CacheBackend,
            ConfigKey::CacheTtlSecs,
            ConfigKey::CacheMaxEntries,
            ConfigKey::CacheUrl,
            ConfigKey::FetchMaxConcurrent,
            ConfigKey::SchedulerScanHour,
            ConfigKey::SchedulerScanMinute,
            ConfigKey::PushFcmServerKey,
            ConfigKey::PushRadiusKm,
            ConfigKey::PushMaxConcurrent,
            ConfigKey::LoggingFile,
        ]
    }
}

// ============================================================================
// Value Specifications (Specification Pattern)
// ============================================================================

/// Trait for value validation specifications.
trait ValueSpecification {
    /// Returns Ok(()) if valid, Err(reason) if invalid.
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

/// Specification that accepts any string value.
struct AnyStringSpec;

impl ValueSpecification for AnyStringSpec {
    fn is_satisfied_by(&self, _value: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Specification that requires the value to be one of a set of options.
struct OneOfSpec {
    options: &'static [&'static str],
}

impl OneOfSpec {
    fn new(options: &'static [&'static str]) -> Self {
        Self { options }
    }
}

impl ValueSpecification for OneOfSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let lower = value.to_lowercase();
        if self.options.iter().any(|opt| *opt == lower) {
            Ok(())
        } else {
            Err(format!("must be one of: {}", self.options.join(", ")))
        }
    }
}

/// Specification for integers greater than zero.
struct PositiveIntegerSpec;

impl ValueSpecification for PositiveIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<u64>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err("must be a positive integer".to_string()),
        }
    }
}

/// Specification for an integer within an inclusive range.
struct RangeSpec {
    min: u32,
    max: u32,
}

impl RangeSpec {
    fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

impl ValueSpecification for RangeSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<u32>() {
            Ok(n) if (self.min..=self.max).contains(&n) => Ok(()),
            _ => Err(format!(
                "must be an integer from {} to {}",
                self.min, self.max
            )),
        }
    }
}

/// Specification for finite floating-point numbers greater than zero.
struct PositiveNumberSpec;

impl ValueSpecification for PositiveNumberSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<f64>() {
            Ok(n) if n.is_finite() && n > 0.0 => Ok(()),
            _ => Err("must be a positive number".to_string()),
        }
    }
}

/// Specification for path values (non-empty).
struct PathSpec;

impl ValueSpecification for PathSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            Err("must be a valid path".to_string())
        } else {
            Ok(())
        }
    }
}
