//! Sentinel-2 NDVI provider backed by the Copernicus Data Space process API.
//!
//! # Request
//!
//! Each lookup asks the process API for a 1x1 FLOAT32 TIFF covering a tiny
//! bounding box (±0.0001°) around the point. The evalscript computes
//! `NDVI = (B08 - B04) / (B08 + B04)` and writes `-1` for pixels where the
//! ratio is not finite (no cloud-free observation, water, nodata).
//!
//! # Authentication
//!
//! Requests carry a bearer token from a client-credential exchange against
//! the CDSE identity realm. Tokens are cached in a [`CredentialCache`]. When
//! the process API answers 401, the token is refreshed exactly once and the
//! lookup retried once; a second failure is returned to the caller.

use super::credential::{obtain_token, ClientCredentials, CredentialCache};
use super::http::{with_timeout, AsyncHttpClient};
use super::types::{IndexProvider, ProviderError};
use crate::coord::Coordinate;
use chrono::NaiveDate;
use std::io::Cursor;
use std::time::Duration;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::{debug, warn};

/// CDSE OpenID token endpoint.
pub const SENTINEL_TOKEN_URL: &str =
    "https://identity.dataspace.copernicus.eu/auth/realms/CDSE/protocol/openid-connect/token";

/// Sentinel Hub process API on CDSE.
pub const SENTINEL_PROCESS_URL: &str = "https://sh.dataspace.copernicus.eu/api/v1/process";

/// Half-width of the bounding box around the requested point, in degrees.
const BBOX_DELTA: f64 = 0.0001;

/// Marker the evalscript writes for pixels with no valid index.
const NO_DATA_MARKER: f64 = -1.0;

const EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
    return {
        input: ["B04", "B08"],
        output: { bands: 1, sampleType: "FLOAT32" }
    };
}
function evaluatePixel(p) {
    let ndvi = (p.B08 - p.B04) / (p.B08 + p.B04);
    if (!isFinite(ndvi)) ndvi = -1;
    return [ndvi];
}
"#;

/// Sentinel-2 L2A NDVI provider.
pub struct SentinelHubProvider<C: AsyncHttpClient> {
    http_client: C,
    credentials: ClientCredentials,
    token_cache: CredentialCache,
    token_url: String,
    process_url: String,
    timeout: Duration,
}

impl<C: AsyncHttpClient> SentinelHubProvider<C> {
    /// Creates a provider against the public CDSE endpoints.
    ///
    /// # Arguments
    ///
    /// * `http_client` - Client used for both token exchange and lookups
    /// * `credentials` - OAuth client id and secret
    /// * `token_margin` - Age after which a cached token is replaced
    /// * `timeout` - Upper bound on each individual network call
    pub fn new(
        http_client: C,
        credentials: ClientCredentials,
        token_margin: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            credentials,
            token_cache: CredentialCache::new(token_margin),
            token_url: SENTINEL_TOKEN_URL.to_string(),
            process_url: SENTINEL_PROCESS_URL.to_string(),
            timeout,
        }
    }

    /// Overrides the token and process endpoints.
    pub fn with_endpoints(mut self, token_url: impl Into<String>, process_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.process_url = process_url.into();
        self
    }

    /// The credential cache shared by every lookup on this provider.
    pub fn token_cache(&self) -> &CredentialCache {
        &self.token_cache
    }

    async fn token(&self, force: bool) -> Result<String, ProviderError> {
        obtain_token(
            &self.token_cache,
            &self.http_client,
            &self.token_url,
            &self.credentials,
            self.timeout,
            force,
        )
        .await
    }

    async fn process(&self, body: &str, token: &str) -> Result<Vec<u8>, ProviderError> {
        let auth = format!("Bearer {}", token);
        let headers = [("Authorization", auth.as_str()), ("Accept", "image/tiff")];
        with_timeout(
            self.timeout,
            "process request",
            self.http_client.post_json(&self.process_url, body, &headers),
        )
        .await
    }
}

/// Builds the process API request body for a point.
pub fn process_request_body(coord: Coordinate, date: Option<NaiveDate>) -> String {
    let bbox = [
        coord.lon - BBOX_DELTA,
        coord.lat - BBOX_DELTA,
        coord.lon + BBOX_DELTA,
        coord.lat + BBOX_DELTA,
    ];

    let mut data = serde_json::json!({ "type": "sentinel-2-l2a" });
    if let Some(day) = date {
        data["dataFilter"] = serde_json::json!({
            "timeRange": {
                "from": format!("{}T00:00:00Z", day),
                "to": format!("{}T23:59:59Z", day),
            }
        });
    }

    serde_json::json!({
        "input": {
            "bounds": { "bbox": bbox },
            "data": [data],
        },
        "output": {
            "width": 1,
            "height": 1,
            "responses": [
                { "identifier": "default", "format": { "type": "image/tiff" } }
            ],
        },
        "evalscript": EVALSCRIPT,
    })
    .to_string()
}

/// Reads the first pixel of a single-band TIFF.
///
/// Returns `None` for the no-data marker or a non-finite pixel.
pub fn decode_pixel(bytes: &[u8]) -> Result<Option<f64>, ProviderError> {
    let mut decoder = Decoder::new(Cursor::new(bytes))
        .map_err(|e| ProviderError::InvalidResponse(format!("TIFF header: {}", e)))?;
    let image = decoder
        .read_image()
        .map_err(|e| ProviderError::InvalidResponse(format!("TIFF data: {}", e)))?;

    let pixel = match image {
        DecodingResult::F32(values) => values.first().map(|v| f64::from(*v)),
        DecodingResult::F64(values) => values.first().copied(),
        _ => {
            return Err(ProviderError::InvalidResponse(
                "TIFF is not floating point".to_string(),
            ))
        }
    };

    let pixel = pixel.ok_or_else(|| ProviderError::InvalidResponse("empty TIFF".to_string()))?;
    if pixel.is_finite() && pixel > NO_DATA_MARKER {
        Ok(Some(pixel))
    } else {
        Ok(None)
    }
}

impl<C: AsyncHttpClient> IndexProvider for SentinelHubProvider<C> {
    async fn lookup(
        &self,
        coord: Coordinate,
        date: Option<NaiveDate>,
    ) -> Result<Option<f64>, ProviderError> {
        let body = process_request_body(coord, date);

        let token = self.token(false).await?;
        let bytes = match self.process(&body, &token).await {
            Err(e) if e.is_unauthorized() => {
                warn!(coord = %coord, "Credential rejected, refreshing and retrying once");
                let fresh = self.token(true).await?;
                self.process(&body, &fresh).await?
            }
            other => other?,
        };

        let value = decode_pixel(&bytes)?;
        debug!(coord = %coord, value = ?value, "Sentinel lookup complete");
        Ok(value)
    }

    fn name(&self) -> &str {
        "sentinel"
    }

    fn resolve_date(&self, requested: Option<NaiveDate>) -> Option<NaiveDate> {
        requested
    }
}
