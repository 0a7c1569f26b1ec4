//! The daily stress scan job.

use super::types::{JobError, ScheduledTask, TaskFuture};
use crate::events::{EventBroadcaster, RealtimeEvent};
use crate::store::AlertStore;
use crate::stress::StressScanner;
use std::sync::Arc;
use tracing::info;

/// Id under which the daily scan is registered.
pub const DAILY_SCAN_JOB_ID: &str = "daily_ndvi_stress_scan";

/// Rebuilds the alert set, then broadcasts it.
///
/// The broadcast happens only after the scan has finished writing, so
/// subscribers never see a half-replaced set from this run.
#[derive(Clone)]
pub struct StressScanJob {
    scanner: Arc<StressScanner>,
    alerts: Arc<dyn AlertStore>,
    broadcaster: EventBroadcaster,
}

impl StressScanJob {
    pub fn new(
        scanner: Arc<StressScanner>,
        alerts: Arc<dyn AlertStore>,
        broadcaster: EventBroadcaster,
    ) -> Self {
        Self {
            scanner,
            alerts,
            broadcaster,
        }
    }

    /// Runs one scan and broadcast cycle.
    pub fn run_once(&self) -> Result<usize, JobError> {
        let created = self.scanner.scan()?;
        let active = self.alerts.unresolved()?;
        let receivers = self
            .broadcaster
            .publish(RealtimeEvent::NdviStressUpdate(active));
        info!(
            alerts_created = created,
            receivers = receivers,
            "Stress update broadcast"
        );
        Ok(created)
    }
}

impl ScheduledTask for StressScanJob {
    fn name(&self) -> &str {
        "ndvi stress scan"
    }

    fn run(&self) -> TaskFuture {
        let job = self.clone();
        Box::pin(async move { job.run_once().map(|_| ()) })
    }
}
