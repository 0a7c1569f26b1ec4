//! Storage seams used by the scanner, dispatcher and service.
//!
//! The in-process implementation is [`MemoryStore`](super::MemoryStore).

use super::types::{Device, IndexSample, NewStressAlert, StoreError, StressAlert};
use crate::coord::{Coordinate, LocationKey};
use crate::events::{DetectionEvent, OutbreakEvent};

/// Append-only index sample history.
pub trait SampleStore: Send + Sync {
    /// Appends a sample at the rounded coordinate and returns it.
    fn append(&self, coord: Coordinate, value: f64) -> Result<IndexSample, StoreError>;

    /// Distinct rounded locations that have at least one sample.
    fn locations(&self) -> Result<Vec<LocationKey>, StoreError>;

    /// Up to `limit` samples for a location, newest first.
    fn recent(&self, location: LocationKey, limit: usize) -> Result<Vec<IndexSample>, StoreError>;
}

/// Active stress alert set.
pub trait AlertStore: Send + Sync {
    /// Deletes every unresolved alert, returning how many were removed.
    fn delete_unresolved(&self) -> Result<usize, StoreError>;

    /// Inserts a new unresolved alert.
    fn insert(&self, alert: NewStressAlert) -> Result<StressAlert, StoreError>;

    /// Unresolved alerts, newest first.
    fn unresolved(&self) -> Result<Vec<StressAlert>, StoreError>;

    /// Marks an alert resolved so later scans leave it alone.
    fn resolve(&self, id: u64) -> Result<StressAlert, StoreError>;
}

/// Push device registry.
pub trait DeviceRegistry: Send + Sync {
    /// Inserts or replaces a device by id.
    fn upsert(&self, device: Device) -> Result<(), StoreError>;

    /// Every registered device.
    fn devices(&self) -> Result<Vec<Device>, StoreError>;
}

/// Reported disease outbreaks and detections, kept for location queries.
pub trait IncidentLog: Send + Sync {
    fn add_outbreak(&self, event: OutbreakEvent) -> Result<(), StoreError>;

    /// Every stored outbreak, oldest first.
    fn outbreaks(&self) -> Result<Vec<OutbreakEvent>, StoreError>;

    fn add_detection(&self, event: DetectionEvent) -> Result<(), StoreError>;

    /// Every stored detection, oldest first.
    fn detections(&self) -> Result<Vec<DetectionEvent>, StoreError>;
}
