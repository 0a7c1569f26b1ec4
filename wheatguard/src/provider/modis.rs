//! MODIS MOD13Q1 NDVI provider (ORNL DAAC REST service).
//!
//! MOD13Q1 is a 16-day composite. Composites start on day-of-year 1, 17,
//! 33, ... so any requested date is snapped back to the start of the
//! composite that contains it before the lookup.
//!
//! # URL Pattern
//!
//! `https://modis.ornl.gov/rst/api/v1/MOD13Q1?latitude={lat}&longitude={lon}&date={yyyy-mm-dd}`
//!
//! The service answers with a JSON object whose `ndvi` field is a number or
//! null. No authentication is required.

use super::http::{with_timeout, AsyncHttpClient};
use super::types::{IndexProvider, ProviderError};
use crate::coord::Coordinate;
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Base URL for MOD13Q1 point lookups.
pub const MODIS_BASE_URL: &str = "https://modis.ornl.gov/rst/api/v1/MOD13Q1";

/// Length of a MOD13Q1 compositing period in days.
const COMPOSITE_DAYS: u32 = 16;

/// Snaps a date to the first day of its 16-day MODIS composite.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use wheatguard::provider::nearest_modis_date;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
/// assert_eq!(nearest_modis_date(date), NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
/// ```
pub fn nearest_modis_date(date: NaiveDate) -> NaiveDate {
    let ordinal = ((date.ordinal() - 1) / COMPOSITE_DAYS) * COMPOSITE_DAYS + 1;
    NaiveDate::from_yo_opt(date.year(), ordinal).unwrap_or(date)
}

#[derive(Debug, Deserialize)]
struct ModisResponse {
    ndvi: Option<f64>,
}

/// MODIS 16-day NDVI provider.
pub struct ModisProvider<C: AsyncHttpClient> {
    http_client: C,
    base_url: String,
    timeout: Duration,
}

impl<C: AsyncHttpClient> ModisProvider<C> {
    pub fn new(http_client: C, timeout: Duration) -> Self {
        Self {
            http_client,
            base_url: MODIS_BASE_URL.to_string(),
            timeout,
        }
    }

    /// Overrides the service endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_url(&self, coord: Coordinate, date: NaiveDate) -> String {
        format!(
            "{}?latitude={}&longitude={}&date={}",
            self.base_url, coord.lat, coord.lon, date
        )
    }
}

impl<C: AsyncHttpClient> IndexProvider for ModisProvider<C> {
    async fn lookup(
        &self,
        coord: Coordinate,
        date: Option<NaiveDate>,
    ) -> Result<Option<f64>, ProviderError> {
        let composite = nearest_modis_date(date.unwrap_or_else(|| Utc::now().date_naive()));
        let url = self.build_url(coord, composite);

        let body = with_timeout(self.timeout, "MODIS lookup", self.http_client.get(&url)).await?;
        let parsed: ModisResponse = serde_json::from_slice(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("MODIS response: {}", e)))?;

        let value = parsed.ndvi.filter(|v| v.is_finite());
        debug!(coord = %coord, date = %composite, value = ?value, "MODIS lookup complete");
        Ok(value)
    }

    fn name(&self) -> &str {
        "modis"
    }

    fn resolve_date(&self, requested: Option<NaiveDate>) -> Option<NaiveDate> {
        Some(nearest_modis_date(
            requested.unwrap_or_else(|| Utc::now().date_naive()),
        ))
    }
}
