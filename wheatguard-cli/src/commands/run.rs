//! Run command - the long-running daemon.
//!
//! Schedules the daily stress scan, logs every real-time event and runs
//! until Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use wheatguard::events::RealtimeEvent;
use wheatguard::scheduler::{Scheduler, DAILY_SCAN_JOB_ID};
use wheatguard::service::Stores;

use super::common::{ingest_samples, load_samples};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the run command.
#[derive(Default)]
pub struct RunArgs {
    /// Samples to preload, oldest first
    pub samples: Option<PathBuf>,
    /// Run one scan immediately after startup
    pub scan_now: bool,
    pub debug: bool,
}

/// Run the daemon until Ctrl-C.
pub async fn run(args: RunArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.debug, true)?;
    runner.log_startup("run");
    let config = runner.config();

    let service = runner.create_service(Stores::in_memory()).await?;
    if let Some(path) = &args.samples {
        let records = load_samples(path)?;
        let ingested = ingest_samples(&service, &records)?;
        info!(samples = ingested, path = %path.display(), "Samples preloaded");
    }

    let shutdown = CancellationToken::new();
    let event_log = tokio::spawn(log_events(service.subscribe(), shutdown.clone()));

    let job = Arc::new(service.scan_job());
    if args.scan_now {
        if let Err(e) = job.run_once() {
            error!(error = %e, "Startup scan failed");
        }
    }

    let trigger = config.scan_trigger()?;
    let scheduler = Scheduler::new(shutdown.clone());
    scheduler.schedule_daily(DAILY_SCAN_JOB_ID, trigger, job);
    info!(
        job_id = DAILY_SCAN_JOB_ID,
        trigger = %trigger,
        push_enabled = service.push_enabled(),
        "WheatGuard running, press Ctrl-C to stop"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C, shutting down");
    }

    info!("Shutting down");
    shutdown.cancel();
    scheduler.shutdown().await;
    let _ = event_log.await;
    Ok(())
}

/// Logs every broadcast event until cancelled or the channel closes.
async fn log_events(mut events: broadcast::Receiver<RealtimeEvent>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            received = events.recv() => match received {
                Ok(event) => log_event(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Event log lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

fn log_event(event: &RealtimeEvent) {
    match event {
        RealtimeEvent::NdviStressUpdate(alerts) => {
            info!(topic = %event.topic(), active_alerts = alerts.len(), "Event broadcast");
        }
        RealtimeEvent::NewAlert(outbreak) => {
            info!(
                topic = %event.topic(),
                id = outbreak.id,
                disease = %outbreak.disease,
                "Event broadcast"
            );
        }
        RealtimeEvent::NewDetection(detection) => {
            info!(
                topic = %event.topic(),
                id = detection.id,
                disease = %detection.disease,
                "Event broadcast"
            );
        }
    }
}
