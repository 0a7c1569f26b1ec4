//! Proximity push dispatch.
//!
//! For an outbreak event, every registered device with a known location
//! within the radius (inclusive) gets one notification. Sends run with
//! bounded concurrency. A failed send is logged and counted; it never
//! cancels the other sends and is not retried.

use super::sender::PushSender;
use super::types::{DispatchReport, PushNotification};
use crate::coord::{haversine_km, Coordinate};
use crate::events::OutbreakEvent;
use crate::store::{Device, DeviceRegistry, StoreError};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Default notification radius in kilometres.
pub const DEFAULT_PUSH_RADIUS_KM: f64 = 5.0;

/// Default number of sends in flight.
pub const DEFAULT_PUSH_CONCURRENCY: usize = 8;

/// Builds the notification a device receives for an outbreak.
pub fn outbreak_notification(
    event: &OutbreakEvent,
    token: &str,
    distance_km: f64,
) -> PushNotification {
    let mut data = BTreeMap::new();
    data.insert("lat".to_string(), event.lat.to_string());
    data.insert("lon".to_string(), event.lon.to_string());
    data.insert("disease".to_string(), event.disease.clone());

    PushNotification {
        token: token.to_string(),
        title: format!("Disease Alert: {}", event.disease),
        body: format!(
            "{} severity near your area ({:.1} km)",
            event.severity, distance_km
        ),
        data,
    }
}

/// Sends outbreak notifications to nearby devices.
pub struct PushDispatcher<S: PushSender> {
    sender: S,
    devices: Arc<dyn DeviceRegistry>,
    radius_km: f64,
    max_concurrent: usize,
}

impl<S: PushSender> PushDispatcher<S> {
    pub fn new(sender: S, devices: Arc<dyn DeviceRegistry>) -> Self {
        Self {
            sender,
            devices,
            radius_km: DEFAULT_PUSH_RADIUS_KM,
            max_concurrent: DEFAULT_PUSH_CONCURRENCY,
        }
    }

    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Devices within the radius of a point, with their distances.
    pub fn devices_near(&self, origin: Coordinate) -> Result<Vec<(Device, f64)>, StoreError> {
        Ok(self.within_radius(origin, self.devices.devices()?))
    }

    fn within_radius(&self, origin: Coordinate, devices: Vec<Device>) -> Vec<(Device, f64)> {
        devices
            .into_iter()
            .filter_map(|device| {
                let distance = haversine_km(origin, device.coord?);
                (distance <= self.radius_km).then_some((device, distance))
            })
            .collect()
    }

    /// Notifies every device near the event.
    ///
    /// The registry is read once; devices registered mid-dispatch wait for
    /// the next outbreak. Fails only when the registry cannot be read.
    pub async fn dispatch(&self, event: &OutbreakEvent) -> Result<DispatchReport, StoreError> {
        let snapshot = self.devices.devices()?;
        let considered = snapshot.len();
        let targets = self.within_radius(event.coordinate(), snapshot);

        let mut report = DispatchReport {
            considered,
            in_range: targets.len(),
            ..Default::default()
        };

        let outcomes: Vec<bool> = stream::iter(targets)
            .map(|(device, distance)| async move {
                let notification = outbreak_notification(event, &device.push_token, distance);
                match self.sender.send(&notification).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(
                            device_id = %device.device_id,
                            error = %e,
                            "Push notification failed"
                        );
                        false
                    }
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        report.delivered = outcomes.iter().filter(|ok| **ok).count();
        report.failed = outcomes.len() - report.delivered;

        info!(
            alert_id = event.id,
            considered = report.considered,
            in_range = report.in_range,
            delivered = report.delivered,
            failed = report.failed,
            "Proximity dispatch complete"
        );
        Ok(report)
    }
}
