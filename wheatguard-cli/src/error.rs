//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use wheatguard::config::ConfigFileError;
use wheatguard::service::ServiceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to create service
    ServiceCreation(ServiceError),
    /// A service operation failed
    Service(ServiceError),
    /// Invalid command-line input or input file content
    Input(String),
    /// Failed to read an input file
    FileRead { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit code for this error: 2 for bad input or configuration, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Input(_) => 2,
            CliError::Service(ServiceError::InvalidCoordinates(_))
            | CliError::Service(ServiceError::InvalidValue(_))
            | CliError::Service(ServiceError::InvalidPolygon(_)) => 2,
            _ => 1,
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::ServiceCreation(ServiceError::ConfigError(_)) = self {
            eprintln!();
            eprintln!("If using the sentinel provider, make sure:");
            eprintln!("  1. provider.sentinel_client_id is set");
            eprintln!("  2. provider.sentinel_client_secret is set");
            eprintln!("  3. The OAuth client exists in the Copernicus Data Space dashboard");
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ServiceCreation(e) => write!(f, "Failed to create service: {}", e),
            CliError::Service(e) => write!(f, "{}", e),
            CliError::Input(msg) => write!(f, "Invalid input: {}", msg),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ServiceCreation(e) => Some(e),
            CliError::Service(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Service(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}
