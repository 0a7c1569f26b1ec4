//! Service builder for constructing a [`WheatGuardService`] from a config file.
//!
//! Each collaborator gets its own small constructor so it can be tested
//! in isolation; [`build_service`] wires them together.

use super::config::ServiceConfig;
use super::error::ServiceError;
use super::facade::{Stores, WheatGuardService};
use crate::cache::{create_value_cache, ValueCache};
use crate::config::ConfigFile;
use crate::fetcher::IndexFetcher;
use crate::provider::{AsyncReqwestClient, IndexProviderType, ProviderFactory};
use crate::push::FcmSender;
use std::sync::Arc;
use tracing::info;

/// Service wired to the real HTTP provider and FCM sender.
pub type DefaultService = WheatGuardService<IndexProviderType, FcmSender<AsyncReqwestClient>>;

/// Create the shared HTTP client.
pub fn create_http_client(config: &ConfigFile) -> Result<AsyncReqwestClient, ServiceError> {
    AsyncReqwestClient::with_timeout(config.http.timeout)
        .map_err(|e| ServiceError::HttpClientError(e.to_string()))
}

/// Create the index provider selected by `provider.type`.
pub fn create_provider(
    config: &ConfigFile,
    http_client: AsyncReqwestClient,
) -> Result<IndexProviderType, ServiceError> {
    let provider_config = config.provider_config()?;
    let factory = ProviderFactory::new(http_client, config.http_timeout());
    let provider = factory.create(&provider_config)?;
    info!(provider = provider_config.name(), "Index provider created");
    Ok(provider)
}

/// Create the value cache selected by `cache.backend`.
///
/// A Redis backend that cannot be reached falls back to memory.
pub async fn create_cache(config: &ConfigFile) -> Arc<dyn ValueCache> {
    let cache = create_value_cache(&config.cache_config()).await;
    info!(
        backend = cache.backend(),
        ttl_secs = config.cache.ttl_secs,
        max_entries = config.cache.max_entries,
        "Value cache created"
    );
    cache
}

/// Create the FCM sender, or `None` when no server key is configured.
pub fn create_push_sender(
    config: &ConfigFile,
    http_client: AsyncReqwestClient,
) -> Option<FcmSender<AsyncReqwestClient>> {
    match &config.push.fcm_server_key {
        Some(key) => Some(FcmSender::new(http_client, key.clone(), config.http_timeout())),
        None => {
            info!("No FCM server key configured, outbreak push disabled");
            None
        }
    }
}

/// Service-level settings derived from the config file.
pub fn service_config(config: &ConfigFile) -> ServiceConfig {
    ServiceConfig::builder()
        .fetcher(config.fetcher_config())
        .push_radius_km(config.push.radius_km)
        .push_max_concurrent(config.push.max_concurrent)
        .build()
}

/// Build the complete service from a config file and a set of stores.
pub async fn build_service(
    config: &ConfigFile,
    stores: Stores,
) -> Result<DefaultService, ServiceError> {
    let http_client = create_http_client(config)?;
    let provider = create_provider(config, http_client.clone())?;
    let cache = create_cache(config).await;
    let sender = create_push_sender(config, http_client);
    let service_config = service_config(config);

    let fetcher = IndexFetcher::new(provider, cache, *service_config.fetcher());
    Ok(WheatGuardService::new(service_config, fetcher, stores, sender))
}
