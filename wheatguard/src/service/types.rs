//! Response shapes returned by the service facade.

use crate::coord::{round_to, Coordinate};
use crate::events::{DetectionEvent, OutbreakEvent};
use crate::fetcher::PolygonAverage;
use crate::push::DispatchReport;
use crate::stress::classify_index;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Status reported when no index value is available.
pub const NO_DATA_STATUS: &str = "no data";

fn status_for(value: Option<f64>) -> String {
    match value {
        Some(v) => classify_index(v).to_string(),
        None => NO_DATA_STATUS.to_string(),
    }
}

/// Result of an on-demand scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResponse {
    pub status: String,
    pub alerts_created: usize,
}

impl ScanResponse {
    pub fn ok(alerts_created: usize) -> Self {
        Self {
            status: "ok".to_string(),
            alerts_created,
        }
    }
}

/// Index value at a single point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointIndexResponse {
    pub lat: f64,
    pub lon: f64,
    /// Date the provider was actually asked for
    pub date_used: Option<NaiveDate>,
    pub value: Option<f64>,
    /// "Healthy", "Stressed", "Critical" or "no data"
    pub status: String,
}

impl PointIndexResponse {
    pub fn new(coord: Coordinate, date_used: Option<NaiveDate>, value: Option<f64>) -> Self {
        Self {
            lat: coord.lat,
            lon: coord.lon,
            date_used,
            value,
            status: status_for(value),
        }
    }
}

/// Index averaged over a polygon's vertices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonIndexResponse {
    pub date_used: Option<NaiveDate>,
    pub average: Option<f64>,
    pub vertices_used: usize,
    pub status: String,
}

impl PolygonIndexResponse {
    pub fn new(date_used: Option<NaiveDate>, result: &PolygonAverage) -> Self {
        let vertices_used = match result {
            PolygonAverage::Value { vertices_used, .. } => *vertices_used,
            PolygonAverage::NoData => 0,
        };
        Self {
            date_used,
            average: result.average(),
            vertices_used,
            status: status_for(result.average()),
        }
    }
}

/// One entry of a location's sample history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub value: f64,
    pub observed_at: DateTime<Utc>,
}

/// What happened when an outbreak was recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutbreakOutcome {
    /// Real-time subscribers the `new_alert` event reached
    pub receivers: usize,
    /// Push results, `None` when push is disabled or the registry failed
    pub push: Option<DispatchReport>,
}

/// A stored outbreak near a queried point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyAlert {
    pub id: u64,
    pub disease: String,
    pub severity: String,
    pub cases: u32,
    pub lat: f64,
    pub lon: f64,
    /// Kilometres from the queried point, two decimals
    pub distance_km: f64,
    pub timestamp: DateTime<Utc>,
}

impl NearbyAlert {
    pub fn new(event: &OutbreakEvent, distance_km: f64) -> Self {
        Self {
            id: event.id,
            disease: event.disease.clone(),
            severity: event.severity.clone(),
            cases: event.cases,
            lat: event.lat,
            lon: event.lon,
            distance_km: round_to(distance_km, 2),
            timestamp: event.timestamp,
        }
    }
}

/// A stored detection near a queried point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyDetection {
    pub id: u64,
    pub disease: String,
    pub severity: String,
    pub distance_km: f64,
}

impl NearbyDetection {
    pub fn new(event: &DetectionEvent, distance_km: f64) -> Self {
        Self {
            id: event.id,
            disease: event.disease.clone(),
            severity: event.severity.clone(),
            distance_km: round_to(distance_km, 2),
        }
    }
}
