//! Vegetation index provider abstraction
//!
//! This module provides the [`IndexProvider`] trait and implementations that
//! read a single NDVI value for a coordinate from remote-sensing services
//! (Sentinel-2 via Copernicus Data Space, MODIS via ORNL DAAC).
//!
//! # Factory Pattern
//!
//! For centralized provider creation, use the [`ProviderFactory`]:
//!
//! ```ignore
//! use wheatguard::provider::{AsyncReqwestClient, ProviderConfig, ProviderFactory};
//!
//! let http_client = AsyncReqwestClient::new()?;
//! let factory = ProviderFactory::new(http_client, Duration::from_secs(30));
//! let provider = factory.create(&ProviderConfig::Modis)?;
//! ```

mod credential;
mod factory;
mod http;
mod modis;
mod sentinel;
mod types;

pub use credential::{
    exchange_token, obtain_token, ClientCredentials, Credential, CredentialCache,
    DEFAULT_TOKEN_MARGIN_SECS,
};
pub use factory::{IndexProviderType, ProviderConfig, ProviderFactory};
pub use http::{with_timeout, AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use modis::{nearest_modis_date, ModisProvider, MODIS_BASE_URL};
pub use sentinel::{
    decode_pixel, process_request_body, SentinelHubProvider, SENTINEL_PROCESS_URL,
    SENTINEL_TOKEN_URL,
};
pub use types::{IndexProvider, ProviderError};

#[cfg(test)]
pub use http::tests::{MockAsyncHttpClient, RecordedRequest};
