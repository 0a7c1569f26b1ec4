//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and service creation
//! to reduce duplication across command handlers.

use crate::error::CliError;
use std::path::Path;
use tracing::info;
use wheatguard::config::{ConfigFile, DEFAULT_LOG_FILE_NAME};
use wheatguard::logging::{init_logging, LoggingGuard};
use wheatguard::service::{build_service, DefaultService, Stores};

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - Default to debug-level logging when RUST_LOG is unset
    /// * `stdout_logging` - Also log to stdout; off for commands that print JSON
    pub fn new(debug_mode: bool, stdout_logging: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let log_path = &config.logging.file;
        let log_dir = log_path.parent().unwrap_or_else(|| Path::new("."));
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string());

        let logging_guard = init_logging(log_dir, &log_file, stdout_logging, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = wheatguard::VERSION,
            command = command,
            provider = %self.config.provider.provider_type,
            "WheatGuard CLI starting"
        );
    }

    /// Create the service over the given stores.
    pub async fn create_service(&self, stores: Stores) -> Result<DefaultService, CliError> {
        build_service(&self.config, stores)
            .await
            .map_err(CliError::ServiceCreation)
            .inspect(|_| info!("Service created successfully"))
    }
}
