//! Real-time event payloads.

use crate::coord::Coordinate;
use crate::store::StressAlert;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named topic a subscriber can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    NewDetection,
    NewAlert,
    NdviStressUpdate,
}

impl EventTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewDetection => "new_detection",
            Self::NewAlert => "new_alert",
            Self::NdviStressUpdate => "ndvi_stress_update",
        }
    }
}

impl fmt::Display for EventTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A disease detection reported by a field device or drone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub id: u64,
    pub disease: String,
    pub confidence: f64,
    pub severity: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub source: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A disease outbreak alert at a known location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutbreakEvent {
    pub id: u64,
    pub disease: String,
    pub severity: String,
    pub cases: u32,
    pub lat: f64,
    pub lon: f64,
    pub source: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl OutbreakEvent {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// Every event the real-time channel carries.
///
/// Serializes as `{"event": "<topic>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RealtimeEvent {
    NewDetection(DetectionEvent),
    NewAlert(OutbreakEvent),
    NdviStressUpdate(Vec<StressAlert>),
}

impl RealtimeEvent {
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::NewDetection(_) => EventTopic::NewDetection,
            Self::NewAlert(_) => EventTopic::NewAlert,
            Self::NdviStressUpdate(_) => EventTopic::NdviStressUpdate,
        }
    }
}
