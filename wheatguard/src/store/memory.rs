//! In-process store backed by mutex-guarded collections.

use super::traits::{AlertStore, DeviceRegistry, IncidentLog, SampleStore};
use super::types::{Device, IndexSample, NewStressAlert, StoreError, StressAlert};
use crate::coord::{Coordinate, LocationKey};
use crate::events::{DetectionEvent, OutbreakEvent};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Default)]
struct SampleTable {
    next_seq: u64,
    by_location: BTreeMap<LocationKey, Vec<IndexSample>>,
}

#[derive(Default)]
struct AlertTable {
    next_id: u64,
    alerts: Vec<StressAlert>,
}

#[derive(Default)]
struct IncidentTable {
    outbreaks: Vec<OutbreakEvent>,
    detections: Vec<DetectionEvent>,
}

/// Sample, alert, device and incident storage held in memory.
#[derive(Default)]
pub struct MemoryStore {
    samples: Mutex<SampleTable>,
    alerts: Mutex<AlertTable>,
    devices: Mutex<HashMap<String, Device>>,
    incidents: Mutex<IncidentTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored samples.
    pub fn sample_count(&self) -> usize {
        self.samples
            .lock()
            .map(|t| t.by_location.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Every alert, resolved or not, oldest first.
    pub fn all_alerts(&self) -> Result<Vec<StressAlert>, StoreError> {
        let table = self.alerts.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(table.alerts.clone())
    }
}

impl SampleStore for MemoryStore {
    fn append(&self, coord: Coordinate, value: f64) -> Result<IndexSample, StoreError> {
        let mut table = self.samples.lock().map_err(|_| StoreError::LockPoisoned)?;
        table.next_seq += 1;
        let sample = IndexSample {
            seq: table.next_seq,
            coord: coord.rounded(),
            value,
            observed_at: Utc::now(),
        };
        table
            .by_location
            .entry(coord.location_key())
            .or_default()
            .push(sample.clone());
        Ok(sample)
    }

    fn locations(&self) -> Result<Vec<LocationKey>, StoreError> {
        let table = self.samples.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(table.by_location.keys().copied().collect())
    }

    fn recent(&self, location: LocationKey, limit: usize) -> Result<Vec<IndexSample>, StoreError> {
        let table = self.samples.lock().map_err(|_| StoreError::LockPoisoned)?;
        // appended in seq order, so reversing gives newest first
        Ok(table
            .by_location
            .get(&location)
            .map(|samples| samples.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

impl AlertStore for MemoryStore {
    fn delete_unresolved(&self) -> Result<usize, StoreError> {
        let mut table = self.alerts.lock().map_err(|_| StoreError::LockPoisoned)?;
        let before = table.alerts.len();
        table.alerts.retain(|a| a.resolved);
        Ok(before - table.alerts.len())
    }

    fn insert(&self, alert: NewStressAlert) -> Result<StressAlert, StoreError> {
        let mut table = self.alerts.lock().map_err(|_| StoreError::LockPoisoned)?;
        table.next_id += 1;
        let stored = StressAlert {
            id: table.next_id,
            lat: alert.coord.lat,
            lon: alert.coord.lon,
            baseline: alert.baseline,
            current: alert.current,
            drop: alert.drop,
            severity: alert.severity,
            resolved: false,
            created_at: Utc::now(),
        };
        table.alerts.push(stored.clone());
        Ok(stored)
    }

    fn unresolved(&self) -> Result<Vec<StressAlert>, StoreError> {
        let table = self.alerts.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut active: Vec<StressAlert> =
            table.alerts.iter().filter(|a| !a.resolved).cloned().collect();
        active.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(active)
    }

    fn resolve(&self, id: u64) -> Result<StressAlert, StoreError> {
        let mut table = self.alerts.lock().map_err(|_| StoreError::LockPoisoned)?;
        let alert = table
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("alert {}", id)))?;
        alert.resolved = true;
        Ok(alert.clone())
    }
}

impl DeviceRegistry for MemoryStore {
    fn upsert(&self, device: Device) -> Result<(), StoreError> {
        let mut devices = self.devices.lock().map_err(|_| StoreError::LockPoisoned)?;
        devices.insert(device.device_id.clone(), device);
        Ok(())
    }

    fn devices(&self) -> Result<Vec<Device>, StoreError> {
        let devices = self.devices.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(devices.values().cloned().collect())
    }
}

impl IncidentLog for MemoryStore {
    fn add_outbreak(&self, event: OutbreakEvent) -> Result<(), StoreError> {
        let mut table = self.incidents.lock().map_err(|_| StoreError::LockPoisoned)?;
        table.outbreaks.push(event);
        Ok(())
    }

    fn outbreaks(&self) -> Result<Vec<OutbreakEvent>, StoreError> {
        let table = self.incidents.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(table.outbreaks.clone())
    }

    fn add_detection(&self, event: DetectionEvent) -> Result<(), StoreError> {
        let mut table = self.incidents.lock().map_err(|_| StoreError::LockPoisoned)?;
        table.detections.push(event);
        Ok(())
    }

    fn detections(&self) -> Result<Vec<DetectionEvent>, StoreError> {
        let table = self.incidents.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(table.detections.clone())
    }
}
