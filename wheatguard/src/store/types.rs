//! Persisted entity types.

use crate::coord::{Coordinate, LocationKey};
use crate::stress::StressSeverity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One observed vegetation index reading.
///
/// `coord` is already rounded to the shared four-decimal precision.
/// `seq` is assigned by the store and orders samples even when two share a
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSample {
    pub seq: u64,
    pub coord: Coordinate,
    pub value: f64,
    pub observed_at: DateTime<Utc>,
}

impl IndexSample {
    pub fn location(&self) -> LocationKey {
        self.coord.location_key()
    }
}

/// Alert fields computed by a scan, before the store assigns identity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStressAlert {
    pub coord: Coordinate,
    pub baseline: f64,
    pub current: f64,
    pub drop: f64,
    pub severity: StressSeverity,
}

/// A detected sustained decline at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressAlert {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
    pub baseline: f64,
    pub current: f64,
    pub drop: f64,
    pub severity: StressSeverity,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

impl StressAlert {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// A registered push target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: String,
    pub push_token: String,
    pub coord: Option<Coordinate>,
}

impl Device {
    pub fn new(
        device_id: impl Into<String>,
        push_token: impl Into<String>,
        coord: Option<Coordinate>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            push_token: push_token.into(),
            coord,
        }
    }
}

/// Storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("record not found: {0}")]
    NotFound(String),
}
