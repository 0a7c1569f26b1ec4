//! Configuration file handling for ~/.wheatguard/config.ini.
//!
//! Loads and saves user configuration with sensible defaults.
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::defaults::*;
use super::settings::*;

use crate::cache::CacheConfig;
use crate::fetcher::FetcherConfig;
use crate::provider::ProviderConfig;
use crate::scheduler::DailyTrigger;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// A setting required by the selected options is missing
    #[error("Missing configuration: {section}.{key} - {reason}")]
    MissingValue {
        section: String,
        key: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.wheatguard/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.wheatguard/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    /// Provider configuration for the selected `provider.type`.
    pub fn provider_config(&self) -> Result<ProviderConfig, ConfigFileError> {
        match self.provider.provider_type.as_str() {
            "modis" => Ok(ProviderConfig::Modis),
            "sentinel" => {
                let client_id = self.provider.sentinel_client_id.clone().ok_or_else(|| {
                    ConfigFileError::MissingValue {
                        section: "provider".to_string(),
                        key: "sentinel_client_id".to_string(),
                        reason: "required when type = sentinel".to_string(),
                    }
                })?;
                let client_secret =
                    self.provider.sentinel_client_secret.clone().ok_or_else(|| {
                        ConfigFileError::MissingValue {
                            section: "provider".to_string(),
                            key: "sentinel_client_secret".to_string(),
                            reason: "required when type = sentinel".to_string(),
                        }
                    })?;
                Ok(ProviderConfig::Sentinel {
                    client_id,
                    client_secret,
                    token_margin: Duration::from_secs(self.provider.token_margin_secs),
                })
            }
            other => Err(ConfigFileError::InvalidValue {
                section: "provider".to_string(),
                key: "type".to_string(),
                value: other.to_string(),
                reason: format!("must be one of: {}", VALID_PROVIDER_TYPES.join(", ")),
            }),
        }
    }

    /// Per-request HTTP timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout)
    }

    /// Cache backing settings. The entry TTL lives in [`fetcher_config`](Self::fetcher_config).
    pub fn cache_config(&self) -> CacheConfig {
        let config = CacheConfig::default()
            .with_backend(self.cache.backend)
            .with_max_entries(self.cache.max_entries);
        match &self.cache.url {
            Some(url) => config.with_url(url.clone()),
            None => config,
        }
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig::default()
            .with_ttl(Duration::from_secs(self.cache.ttl_secs))
            .with_max_concurrent(self.fetch.max_concurrent)
    }

    /// Trigger for the daily stress scan.
    pub fn scan_trigger(&self) -> Result<DailyTrigger, ConfigFileError> {
        DailyTrigger::new(self.scheduler.scan_hour, self.scheduler.scan_minute).map_err(|e| {
            ConfigFileError::InvalidValue {
                section: "scheduler".to_string(),
                key: "scan_hour".to_string(),
                value: format!(
                    "{}:{:02}",
                    self.scheduler.scan_hour, self.scheduler.scan_minute
                ),
                reason: e.to_string(),
            }
        })
    }
}

/// Get the path to the config directory (~/.wheatguard).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wheatguard")
}

/// Get the path to the config file (~/.wheatguard/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Convert path to display string, collapsing home dir to ~.
pub(super) fn path_to_display(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheBackend;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.provider.provider_type, "modis");
        assert!(config.provider.sentinel_client_id.is_none());
        assert_eq!(config.provider.token_margin_secs, 3300);
        assert_eq!(config.http.timeout, 30);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.ttl_secs, 86_400);
        assert_eq!(config.scheduler.scan_hour, 2);
        assert_eq!(config.scheduler.scan_minute, 0);
        assert_eq!(config.push.radius_km, 5.0);
        assert!(config.logging.file.ends_with("wheatguard.log"));
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config.provider.provider_type, DEFAULT_PROVIDER_TYPE);
        assert_eq!(config.fetch.max_concurrent, DEFAULT_FETCH_MAX_CONCURRENT);
    }

    #[test]
    fn test_save_then_load_preserves_edits() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.provider.provider_type = "sentinel".to_string();
        config.provider.sentinel_client_id = Some("client".to_string());
        config.provider.sentinel_client_secret = Some("secret".to_string());
        config.scheduler.scan_hour = 4;
        config.push.radius_km = 7.5;
        config.cache.backend = CacheBackend::None;
        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded.provider.provider_type, "sentinel");
        assert_eq!(loaded.provider.sentinel_client_id.as_deref(), Some("client"));
        assert_eq!(loaded.scheduler.scan_hour, 4);
        assert_eq!(loaded.push.radius_km, 7.5);
        assert_eq!(loaded.cache.backend, CacheBackend::None);
        assert!(loaded.push.fcm_server_key.is_none());
    }

    #[test]
    fn test_sentinel_requires_credentials() {
        let mut config = ConfigFile::default();
        config.provider.provider_type = "sentinel".to_string();

        assert!(matches!(
            config.provider_config(),
            Err(ConfigFileError::MissingValue { .. })
        ));

        config.provider.sentinel_client_id = Some("id".to_string());
        config.provider.sentinel_client_secret = Some("secret".to_string());
        assert!(config.provider_config().unwrap().requires_credentials());
    }

    #[test]
    fn test_derived_configs() {
        let mut config = ConfigFile::default();
        config.cache.ttl_secs = 60;
        config.cache.max_entries = 25;
        config.fetch.max_concurrent = 4;

        assert_eq!(config.cache_config().max_entries, 25);
        assert!(config.cache_config().url.is_none());
        assert_eq!(config.fetcher_config().ttl, Duration::from_secs(60));
        assert_eq!(config.fetcher_config().max_concurrent, 4);
        assert_eq!(config.scan_trigger().unwrap().hour(), 2);
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }
}
