//! Provider types and traits

use crate::coord::Coordinate;
use chrono::NaiveDate;
use std::fmt;
use std::future::Future;

/// Errors that can occur during provider operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Transport-level failure (connect, DNS, body read)
    HttpError(String),
    /// Non-success HTTP status other than 401
    HttpStatus { status: u16, url: String },
    /// Provider rejected the credential (401)
    Unauthorized(String),
    /// Call did not complete within its time budget
    Timeout(String),
    /// Invalid response data from provider
    InvalidResponse(String),
    /// Credential exchange is not possible (e.g., client id not configured)
    MissingCredentials(String),
}

impl ProviderError {
    /// Whether this failure means the bearer credential should be refreshed.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ProviderError::Unauthorized(_))
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::HttpStatus { status, url } => {
                write!(f, "HTTP {} from {}", status, url)
            }
            ProviderError::Unauthorized(url) => write!(f, "Unauthorized by {}", url),
            ProviderError::Timeout(what) => write!(f, "Timed out: {}", what),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ProviderError::MissingCredentials(msg) => write!(f, "Missing credentials: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Async trait for vegetation index providers.
///
/// A provider turns one coordinate (and optionally a date) into a single
/// index value. Caching and rounding are done by the
/// [`IndexFetcher`](crate::fetcher::IndexFetcher), not here.
pub trait IndexProvider: Send + Sync {
    /// Looks up the index value at a coordinate.
    ///
    /// # Returns
    ///
    /// `Ok(Some(value))` for a valid reading, `Ok(None)` when the provider
    /// answered but has no valid pixel for the location, or an error when
    /// the provider could not be reached or rejected the request.
    fn lookup(
        &self,
        coord: Coordinate,
        date: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Option<f64>, ProviderError>> + Send;

    /// Returns the provider's name for logging and cache keys.
    fn name(&self) -> &str;

    /// Maps a requested date onto the date the provider will actually serve.
    ///
    /// Providers that always return their latest mosaic ignore the date and
    /// return `None`.
    fn resolve_date(&self, _requested: Option<NaiveDate>) -> Option<NaiveDate> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_detection() {
        assert!(ProviderError::Unauthorized("x".into()).is_unauthorized());
        assert!(!ProviderError::HttpStatus {
            status: 403,
            url: "x".into()
        }
        .is_unauthorized());
        assert!(!ProviderError::Timeout("lookup".into()).is_unauthorized());
    }

    #[test]
    fn test_display() {
        let err = ProviderError::HttpStatus {
            status: 503,
            url: "https://example.com".into(),
        };
        assert_eq!(err.to_string(), "HTTP 503 from https://example.com");
    }
}
