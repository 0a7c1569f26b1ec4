//! Bearer credential lifecycle for authenticated providers.
//!
//! A credential is fetched lazily through a client-credential exchange and
//! reused while younger than the configured margin. The margin is shorter
//! than the provider's stated expiry so a token is never sent right at the
//! edge of its lifetime. Expiry is otherwise optimistic: the only other
//! invalidation is a 401 from the provider, which forces a refresh.
//!
//! Concurrent refreshes are not coordinated. Two callers that both find the
//! cache empty will each fetch a token and the last write wins, costing one
//! extra exchange.

use super::http::{with_timeout, AsyncHttpClient};
use super::types::ProviderError;
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Default credential age after which a new token is requested (55 minutes).
pub const DEFAULT_TOKEN_MARGIN_SECS: u64 = 3300;

/// A cached bearer token.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub issued_at: Instant,
}

impl Credential {
    fn new(token: String) -> Self {
        Self {
            token,
            issued_at: Instant::now(),
        }
    }

    /// Age of the credential.
    pub fn age(&self) -> Duration {
        self.issued_at.elapsed()
    }
}

/// Client id and secret for the client-credential exchange.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Holds at most one credential and hands it out while it is fresh.
#[derive(Debug)]
pub struct CredentialCache {
    credential: RwLock<Option<Credential>>,
    margin: Duration,
}

impl CredentialCache {
    /// Create an empty cache with the given validity margin.
    pub fn new(margin: Duration) -> Self {
        Self {
            credential: RwLock::new(None),
            margin,
        }
    }

    /// Get the cached token if it is younger than the margin.
    pub fn valid_token(&self) -> Option<String> {
        let guard = self.credential.read().ok()?;
        guard
            .as_ref()
            .filter(|c| c.age() < self.margin)
            .map(|c| c.token.clone())
    }

    /// Get the cached token regardless of age.
    pub fn current_token(&self) -> Option<String> {
        self.credential
            .read()
            .ok()?
            .as_ref()
            .map(|c| c.token.clone())
    }

    /// Replace the cached credential wholesale.
    pub fn store(&self, token: String) {
        if let Ok(mut guard) = self.credential.write() {
            *guard = Some(Credential::new(token));
        }
    }

    /// Drop the cached credential.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.credential.write() {
            *guard = None;
        }
    }

    /// Validity margin.
    pub fn margin(&self) -> Duration {
        self.margin
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Performs the client-credential exchange against a token endpoint.
pub async fn exchange_token<C: AsyncHttpClient>(
    http_client: &C,
    token_url: &str,
    credentials: &ClientCredentials,
    timeout: Duration,
) -> Result<String, ProviderError> {
    if credentials.client_id.is_empty() {
        return Err(ProviderError::MissingCredentials(
            "client id is not configured".to_string(),
        ));
    }

    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
    ];

    let body = with_timeout(
        timeout,
        "token exchange",
        http_client.post_form(token_url, &form),
    )
    .await?;

    let parsed: TokenResponse = serde_json::from_slice(&body)
        .map_err(|e| ProviderError::InvalidResponse(format!("token response: {}", e)))?;

    debug!(token_url = token_url, "Obtained access token");
    Ok(parsed.access_token)
}

/// Returns a fresh token from the cache, exchanging for a new one if needed.
///
/// With `force` set, the cached token is discarded first.
pub async fn obtain_token<C: AsyncHttpClient>(
    cache: &CredentialCache,
    http_client: &C,
    token_url: &str,
    credentials: &ClientCredentials,
    timeout: Duration,
    force: bool,
) -> Result<String, ProviderError> {
    if force {
        cache.clear();
    } else if let Some(token) = cache.valid_token() {
        return Ok(token);
    }

    let token = exchange_token(http_client, token_url, credentials, timeout).await?;
    cache.store(token.clone());
    info!(forced = force, "Provider credential refreshed");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockAsyncHttpClient;

    const TOKEN_URL: &str = "https://identity.example/token";

    fn token_body(token: &str) -> Vec<u8> {
        format!(r#"{{"access_token":"{}","expires_in":3600}}"#, token).into_bytes()
    }

    fn creds() -> ClientCredentials {
        ClientCredentials::new("client-a", "secret-a")
    }

    #[test]
    fn test_empty_cache_has_no_token() {
        let cache = CredentialCache::new(Duration::from_secs(60));
        assert!(cache.valid_token().is_none());
        assert!(cache.current_token().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_expires_after_margin() {
        let cache = CredentialCache::new(Duration::from_secs(60));
        cache.store("tok".to_string());
        assert_eq!(cache.valid_token().as_deref(), Some("tok"));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.valid_token().is_none());
        assert_eq!(cache.current_token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_client_secret_is_redacted_in_debug() {
        let text = format!("{:?}", creds());
        assert!(text.contains("client-a"));
        assert!(!text.contains("secret-a"));
    }

    #[tokio::test]
    async fn test_obtain_token_uses_cache() {
        let mock = MockAsyncHttpClient::new();
        mock.push_form(Ok(token_body("tok-1")));
        let cache = CredentialCache::new(Duration::from_secs(3300));

        let first = obtain_token(&cache, &mock, TOKEN_URL, &creds(), Duration::from_secs(5), false)
            .await
            .unwrap();
        let second = obtain_token(&cache, &mock, TOKEN_URL, &creds(), Duration::from_secs(5), false)
            .await
            .unwrap();

        assert_eq!(first, "tok-1");
        assert_eq!(second, "tok-1");
        assert_eq!(mock.count("FORM"), 1);

        let request = &mock.requests()[0];
        assert!(request.body.contains("grant_type=client_credentials"));
        assert!(request.body.contains("client_id=client-a"));
    }

    #[tokio::test]
    async fn test_forced_refresh_replaces_token() {
        let mock = MockAsyncHttpClient::new();
        mock.push_form(Ok(token_body("tok-1")))
            .push_form(Ok(token_body("tok-2")));
        let cache = CredentialCache::new(Duration::from_secs(3300));

        obtain_token(&cache, &mock, TOKEN_URL, &creds(), Duration::from_secs(5), false)
            .await
            .unwrap();
        let refreshed =
            obtain_token(&cache, &mock, TOKEN_URL, &creds(), Duration::from_secs(5), true)
                .await
                .unwrap();

        assert_eq!(refreshed, "tok-2");
        assert_eq!(cache.current_token().as_deref(), Some("tok-2"));
    }

    #[tokio::test]
    async fn test_failed_exchange_leaves_cache_empty() {
        let mock = MockAsyncHttpClient::new();
        mock.push_form(Err(ProviderError::HttpStatus {
            status: 400,
            url: TOKEN_URL.into(),
        }));
        let cache = CredentialCache::new(Duration::from_secs(3300));

        let result =
            obtain_token(&cache, &mock, TOKEN_URL, &creds(), Duration::from_secs(5), false).await;

        assert!(result.is_err());
        assert!(cache.current_token().is_none());
    }

    #[tokio::test]
    async fn test_malformed_token_response() {
        let mock = MockAsyncHttpClient::new();
        mock.push_form(Ok(b"not json".to_vec()));

        let result = exchange_token(&mock, TOKEN_URL, &creds(), Duration::from_secs(5)).await;
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_missing_client_id() {
        let mock = MockAsyncHttpClient::new();
        let result = exchange_token(
            &mock,
            TOKEN_URL,
            &ClientCredentials::new("", ""),
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(ProviderError::MissingCredentials(_))));
        assert_eq!(mock.count("FORM"), 0);
    }
}
