//! Provider factory for centralized provider creation.
//!
//! The CLI and service builder describe the provider they want with a
//! [`ProviderConfig`]; [`ProviderFactory`] turns that into a concrete
//! [`IndexProviderType`] wired to the shared HTTP client.

use super::credential::{ClientCredentials, DEFAULT_TOKEN_MARGIN_SECS};
use super::http::AsyncReqwestClient;
use super::modis::ModisProvider;
use super::sentinel::SentinelHubProvider;
use super::types::{IndexProvider, ProviderError};
use crate::coord::Coordinate;
use chrono::NaiveDate;
use std::time::Duration;

/// Configuration for creating a provider.
///
/// # Example
///
/// ```
/// use wheatguard::provider::ProviderConfig;
///
/// // MODIS (no credentials required)
/// let modis = ProviderConfig::Modis;
///
/// // Sentinel-2 via Copernicus Data Space (OAuth client credentials)
/// let sentinel = ProviderConfig::sentinel("client-id", "client-secret");
/// assert!(sentinel.requires_credentials());
/// ```
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// Sentinel-2 L2A NDVI through the CDSE process API.
    Sentinel {
        client_id: String,
        client_secret: String,
        /// Age after which a cached token is replaced
        token_margin: Duration,
    },

    /// MODIS MOD13Q1 16-day composite NDVI.
    ///
    /// No credentials required.
    Modis,
}

impl ProviderConfig {
    /// Sentinel configuration with the default token margin.
    pub fn sentinel(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::Sentinel {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_margin: Duration::from_secs(DEFAULT_TOKEN_MARGIN_SECS),
        }
    }

    pub fn modis() -> Self {
        Self::Modis
    }

    /// Returns the provider name for this configuration.
    pub fn name(&self) -> &str {
        match self {
            Self::Sentinel { .. } => "sentinel",
            Self::Modis => "modis",
        }
    }

    /// Returns whether this provider needs client credentials.
    pub fn requires_credentials(&self) -> bool {
        matches!(self, Self::Sentinel { .. })
    }
}

/// Enum to hold the concrete provider types.
pub enum IndexProviderType {
    Sentinel(SentinelHubProvider<AsyncReqwestClient>),
    Modis(ModisProvider<AsyncReqwestClient>),
}

impl IndexProvider for IndexProviderType {
    async fn lookup(
        &self,
        coord: Coordinate,
        date: Option<NaiveDate>,
    ) -> Result<Option<f64>, ProviderError> {
        match self {
            Self::Sentinel(p) => p.lookup(coord, date).await,
            Self::Modis(p) => p.lookup(coord, date).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Sentinel(p) => p.name(),
            Self::Modis(p) => p.name(),
        }
    }

    fn resolve_date(&self, requested: Option<NaiveDate>) -> Option<NaiveDate> {
        match self {
            Self::Sentinel(p) => p.resolve_date(requested),
            Self::Modis(p) => p.resolve_date(requested),
        }
    }
}

/// Factory for creating provider instances.
pub struct ProviderFactory {
    http_client: AsyncReqwestClient,
    timeout: Duration,
}

impl ProviderFactory {
    /// Create a factory around a shared HTTP client.
    ///
    /// `timeout` bounds every individual network call a provider makes.
    pub fn new(http_client: AsyncReqwestClient, timeout: Duration) -> Self {
        Self {
            http_client,
            timeout,
        }
    }

    /// Create a provider from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingCredentials`] when a Sentinel
    /// configuration has no client id or secret.
    pub fn create(self, config: &ProviderConfig) -> Result<IndexProviderType, ProviderError> {
        match config {
            ProviderConfig::Sentinel {
                client_id,
                client_secret,
                token_margin,
            } => {
                if client_id.is_empty() || client_secret.is_empty() {
                    return Err(ProviderError::MissingCredentials(
                        "sentinel provider needs a client id and secret".to_string(),
                    ));
                }
                let provider = SentinelHubProvider::new(
                    self.http_client,
                    ClientCredentials::new(client_id.clone(), client_secret.clone()),
                    *token_margin,
                    self.timeout,
                );
                Ok(IndexProviderType::Sentinel(provider))
            }
            ProviderConfig::Modis => Ok(IndexProviderType::Modis(ModisProvider::new(
                self.http_client,
                self.timeout,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> ProviderFactory {
        ProviderFactory::new(AsyncReqwestClient::new().unwrap(), Duration::from_secs(5))
    }

    #[test]
    fn test_config_names() {
        assert_eq!(ProviderConfig::modis().name(), "modis");
        assert_eq!(ProviderConfig::sentinel("a", "b").name(), "sentinel");
        assert!(!ProviderConfig::Modis.requires_credentials());
    }

    #[test]
    fn test_sentinel_default_margin() {
        match ProviderConfig::sentinel("a", "b") {
            ProviderConfig::Sentinel { token_margin, .. } => {
                assert_eq!(token_margin, Duration::from_secs(3300))
            }
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[test]
    fn test_create_modis() {
        let provider = factory().create(&ProviderConfig::Modis).unwrap();
        assert_eq!(provider.name(), "modis");
        assert!(provider.resolve_date(None).is_some());
    }

    #[test]
    fn test_create_sentinel() {
        let provider = factory()
            .create(&ProviderConfig::sentinel("id", "secret"))
            .unwrap();
        assert_eq!(provider.name(), "sentinel");
        assert!(provider.resolve_date(None).is_none());
        let day = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert_eq!(provider.resolve_date(Some(day)), Some(day));
    }

    #[test]
    fn test_sentinel_without_credentials_is_rejected() {
        let result = factory().create(&ProviderConfig::sentinel("", ""));
        assert!(matches!(result, Err(ProviderError::MissingCredentials(_))));
    }
}
