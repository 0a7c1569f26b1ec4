//! Service error types.

use crate::config::ConfigFileError;
use crate::coord::CoordError;
use crate::provider::ProviderError;
use crate::store::StoreError;
use std::fmt;

/// Errors that can occur during service operations.
///
/// Only malformed input and failing collaborators surface here. An index
/// value that is simply unavailable is reported as "no data", not an error.
#[derive(Debug)]
pub enum ServiceError {
    /// Failed to create HTTP client
    HttpClientError(String),
    /// Failed to create provider
    ProviderError(ProviderError),
    /// Invalid configuration
    ConfigError(String),
    /// Invalid coordinates
    InvalidCoordinates(CoordError),
    /// Index value outside [-1, 1] or not finite
    InvalidValue(f64),
    /// Malformed polygon or GeoJSON input
    InvalidPolygon(String),
    /// Sample, alert or device store failure
    StoreError(StoreError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpClientError(msg) => write!(f, "HTTP client error: {}", msg),
            Self::ProviderError(e) => write!(f, "Provider error: {}", e),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::InvalidCoordinates(e) => write!(f, "Invalid coordinates: {}", e),
            Self::InvalidValue(value) => {
                write!(f, "Invalid index value {}: must be between -1 and 1", value)
            }
            Self::InvalidPolygon(msg) => write!(f, "Invalid polygon: {}", msg),
            Self::StoreError(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ProviderError(e) => Some(e),
            Self::InvalidCoordinates(e) => Some(e),
            Self::StoreError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProviderError> for ServiceError {
    fn from(e: ProviderError) -> Self {
        Self::ProviderError(e)
    }
}

impl From<CoordError> for ServiceError {
    fn from(e: CoordError) -> Self {
        Self::InvalidCoordinates(e)
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        Self::StoreError(e)
    }
}

impl From<ConfigFileError> for ServiceError {
    fn from(e: ConfigFileError) -> Self {
        Self::ConfigError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_http_client_error() {
        let err = ServiceError::HttpClientError("connection refused".to_string());
        assert!(err.to_string().contains("HTTP client error"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_display_invalid_value() {
        let err = ServiceError::InvalidValue(1.5);
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_from_coord_error() {
        let err: ServiceError = crate::coord::Coordinate::new(91.0, 0.0).unwrap_err().into();
        assert!(matches!(err, ServiceError::InvalidCoordinates(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_from_store_error() {
        let err: ServiceError = StoreError::LockPoisoned.into();
        assert!(matches!(err, ServiceError::StoreError(_)));
    }

    #[test]
    fn test_from_provider_error() {
        let err: ServiceError = ProviderError::Unauthorized("token".to_string()).into();
        assert!(matches!(err, ServiceError::ProviderError(_)));
    }
}
