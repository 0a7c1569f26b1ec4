//! WheatGuard service facade implementation.

use super::config::ServiceConfig;
use super::error::ServiceError;
use super::types::{
    HistoryEntry, NearbyAlert, NearbyDetection, OutbreakOutcome, PointIndexResponse,
    PolygonIndexResponse, ScanResponse,
};
use crate::coord::{haversine_km, Coordinate};
use crate::events::{DetectionEvent, EventBroadcaster, OutbreakEvent, RealtimeEvent};
use crate::fetcher::{IndexFetcher, PolygonAverage};
use crate::provider::IndexProvider;
use crate::push::{PushDispatcher, PushSender};
use crate::scheduler::StressScanJob;
use crate::store::{
    AlertStore, Device, DeviceRegistry, IncidentLog, IndexSample, MemoryStore, SampleStore,
    StressAlert,
};
use crate::stress::StressScanner;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// The stores the service reads and writes.
#[derive(Clone)]
pub struct Stores {
    pub samples: Arc<dyn SampleStore>,
    pub alerts: Arc<dyn AlertStore>,
    pub devices: Arc<dyn DeviceRegistry>,
    pub incidents: Arc<dyn IncidentLog>,
}

impl Stores {
    /// Every store backed by one in-process [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            samples: store.clone(),
            alerts: store.clone(),
            devices: store.clone(),
            incidents: store,
        }
    }
}

/// High-level facade over fetching, scanning and fan-out.
///
/// Wires the [`IndexFetcher`], [`StressScanner`], [`EventBroadcaster`] and
/// optional [`PushDispatcher`] to a set of [`Stores`]. Push is disabled when
/// no sender is given.
///
/// # Example
///
/// ```ignore
/// use wheatguard::service::{build_service, Stores};
/// use wheatguard::config::ConfigFile;
///
/// let service = build_service(&ConfigFile::load()?, Stores::in_memory()).await?;
/// let point = service.point_index(45.0, 7.0, None).await?;
/// println!("{} ({})", point.value.unwrap_or_default(), point.status);
/// ```
pub struct WheatGuardService<P: IndexProvider, S: PushSender> {
    config: ServiceConfig,
    fetcher: IndexFetcher<P>,
    stores: Stores,
    scanner: Arc<StressScanner>,
    broadcaster: EventBroadcaster,
    dispatcher: Option<PushDispatcher<S>>,
}

impl<P: IndexProvider, S: PushSender> WheatGuardService<P, S> {
    pub fn new(
        config: ServiceConfig,
        fetcher: IndexFetcher<P>,
        stores: Stores,
        sender: Option<S>,
    ) -> Self {
        let scanner = Arc::new(
            StressScanner::new(stores.samples.clone(), stores.alerts.clone())
                .with_config(*config.scan()),
        );
        let broadcaster = EventBroadcaster::new(config.event_capacity());
        let dispatcher = sender.map(|sender| {
            PushDispatcher::new(sender, stores.devices.clone())
                .with_radius_km(config.push_radius_km())
                .with_max_concurrent(config.push_max_concurrent())
        });

        info!(
            provider = fetcher.provider().name(),
            push_enabled = dispatcher.is_some(),
            "WheatGuard service ready"
        );

        Self {
            config,
            fetcher,
            stores,
            scanner,
            broadcaster,
            dispatcher,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &IndexFetcher<P> {
        &self.fetcher
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn broadcaster(&self) -> &EventBroadcaster {
        &self.broadcaster
    }

    pub fn push_enabled(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// Subscribes to every real-time event.
    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.broadcaster.subscribe()
    }

    /// Records one index reading from an external source.
    pub fn ingest_sample(&self, lat: f64, lon: f64, value: f64) -> Result<IndexSample, ServiceError> {
        let coord = Coordinate::new(lat, lon)?;
        if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
            return Err(ServiceError::InvalidValue(value));
        }
        Ok(self.stores.samples.append(coord, value)?)
    }

    /// Runs one scan now. Subscribers are not notified.
    pub fn trigger_scan(&self) -> Result<ScanResponse, ServiceError> {
        let created = self.scanner.scan()?;
        Ok(ScanResponse::ok(created))
    }

    /// Scan-and-broadcast job for the scheduler.
    pub fn scan_job(&self) -> StressScanJob {
        StressScanJob::new(
            self.scanner.clone(),
            self.stores.alerts.clone(),
            self.broadcaster.clone(),
        )
    }

    /// Unresolved stress alerts, newest first.
    pub fn active_alerts(&self) -> Result<Vec<StressAlert>, ServiceError> {
        Ok(self.stores.alerts.unresolved()?)
    }

    pub fn resolve_alert(&self, id: u64) -> Result<StressAlert, ServiceError> {
        Ok(self.stores.alerts.resolve(id)?)
    }

    /// Index value at one point.
    ///
    /// An available value is also recorded as a sample for later scans.
    pub async fn point_index(
        &self,
        lat: f64,
        lon: f64,
        date: Option<NaiveDate>,
    ) -> Result<PointIndexResponse, ServiceError> {
        let coord = Coordinate::new(lat, lon)?;
        let date_used = self.fetcher.resolve_date(date);
        let value = self.fetcher.fetch(coord, date).await;

        if let Some(value) = value {
            self.record_sample(coord, value);
        }
        Ok(PointIndexResponse::new(coord, date_used, value))
    }

    /// Index averaged over a ring of coordinates.
    ///
    /// An available average is recorded as a sample at the first vertex.
    pub async fn polygon_index(
        &self,
        ring: &[Coordinate],
        date: Option<NaiveDate>,
    ) -> Result<PolygonIndexResponse, ServiceError> {
        if ring.is_empty() {
            return Err(ServiceError::InvalidPolygon("ring has no vertices".to_string()));
        }
        let date_used = self.fetcher.resolve_date(date);
        let result = self.fetcher.fetch_polygon(ring, date).await;

        if let PolygonAverage::Value {
            average,
            representative,
            ..
        } = result
        {
            self.record_sample(representative, average);
        }
        Ok(PolygonIndexResponse::new(date_used, &result))
    }

    /// Like [`polygon_index`](Self::polygon_index) for a GeoJSON polygon.
    pub async fn polygon_index_geojson(
        &self,
        geojson: &Value,
        date: Option<NaiveDate>,
    ) -> Result<PolygonIndexResponse, ServiceError> {
        let ring = parse_geojson_ring(geojson)?;
        self.polygon_index(&ring, date).await
    }

    /// Most recent samples at a location, newest first.
    pub fn sample_history(&self, lat: f64, lon: f64) -> Result<Vec<HistoryEntry>, ServiceError> {
        let coord = Coordinate::new(lat, lon)?;
        let samples = self
            .stores
            .samples
            .recent(coord.location_key(), self.config.history_limit())?;
        Ok(samples
            .into_iter()
            .map(|s| HistoryEntry {
                value: s.value,
                observed_at: s.observed_at,
            })
            .collect())
    }

    /// Registers or replaces a push target.
    ///
    /// The device gets a location only when both coordinates are given.
    pub fn register_device(
        &self,
        device_id: &str,
        push_token: &str,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<Device, ServiceError> {
        let coord = match (lat, lon) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)?),
            _ => None,
        };
        let device = Device::new(device_id, push_token, coord);
        self.stores.devices.upsert(device.clone())?;
        Ok(device)
    }

    /// Stores and broadcasts a new detection. Returns the number of
    /// subscribers reached.
    ///
    /// A store failure is logged; the broadcast still goes out.
    pub fn record_detection(&self, event: DetectionEvent) -> usize {
        if let Err(e) = self.stores.incidents.add_detection(event.clone()) {
            warn!(detection_id = event.id, error = %e, "Failed to store detection");
        }
        self.broadcaster.publish(RealtimeEvent::NewDetection(event))
    }

    /// Stores a new outbreak, broadcasts it and pushes it to nearby devices.
    ///
    /// A registry failure is logged and reported as `push: None`.
    pub async fn record_outbreak(
        &self,
        event: OutbreakEvent,
    ) -> Result<OutbreakOutcome, ServiceError> {
        Coordinate::new(event.lat, event.lon)?;
        self.stores.incidents.add_outbreak(event.clone())?;

        let receivers = self
            .broadcaster
            .publish(RealtimeEvent::NewAlert(event.clone()));

        let push = match &self.dispatcher {
            Some(dispatcher) => match dispatcher.dispatch(&event).await {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!(alert_id = event.id, error = %e, "Device registry unavailable, push skipped");
                    None
                }
            },
            None => None,
        };

        Ok(OutbreakOutcome { receivers, push })
    }

    /// Stored outbreaks within the nearby radius of a point, nearest first.
    pub fn nearby_alerts(&self, lat: f64, lon: f64) -> Result<Vec<NearbyAlert>, ServiceError> {
        let origin = Coordinate::new(lat, lon)?;
        let radius = self.config.nearby_radius_km();
        let mut nearby: Vec<NearbyAlert> = self
            .stores
            .incidents
            .outbreaks()?
            .iter()
            .filter_map(|event| {
                let distance = haversine_km(origin, event.coordinate());
                (distance <= radius).then(|| NearbyAlert::new(event, distance))
            })
            .collect();
        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(nearby)
    }

    /// Stored detections with a location within the nearby radius of a
    /// point, nearest first.
    pub fn nearby_detections(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Vec<NearbyDetection>, ServiceError> {
        let origin = Coordinate::new(lat, lon)?;
        let radius = self.config.nearby_radius_km();
        let mut nearby: Vec<NearbyDetection> = self
            .stores
            .incidents
            .detections()?
            .iter()
            .filter_map(|event| {
                let at = Coordinate {
                    lat: event.lat?,
                    lon: event.lon?,
                };
                let distance = haversine_km(origin, at);
                (distance <= radius).then(|| NearbyDetection::new(event, distance))
            })
            .collect();
        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(nearby)
    }

    fn record_sample(&self, coord: Coordinate, value: f64) {
        if let Err(e) = self.stores.samples.append(coord, value) {
            warn!(coord = %coord, error = %e, "Failed to record index sample");
        }
    }
}

/// Reads the outer ring of a GeoJSON polygon.
///
/// Accepts a `Feature` or a bare geometry. Each position is read as
/// `[lat, lon]`.
pub fn parse_geojson_ring(geojson: &Value) -> Result<Vec<Coordinate>, ServiceError> {
    let geometry = geojson.get("geometry").unwrap_or(geojson);
    let ring = geometry
        .get("coordinates")
        .and_then(|c| c.get(0))
        .and_then(Value::as_array)
        .ok_or_else(|| ServiceError::InvalidPolygon("missing coordinates[0]".to_string()))?;

    ring.iter()
        .map(|position| {
            let pair = position.as_array().filter(|p| p.len() >= 2).ok_or_else(|| {
                ServiceError::InvalidPolygon(format!("bad position {}", position))
            })?;
            match (pair[0].as_f64(), pair[1].as_f64()) {
                (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)?),
                _ => Err(ServiceError::InvalidPolygon(format!(
                    "non-numeric position {}",
                    position
                ))),
            }
        })
        .collect()
}
