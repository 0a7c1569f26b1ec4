//! Background job scheduler.
//!
//! Each scheduled job runs in its own task: sleep until the trigger fires,
//! run the task, repeat. A failed run is logged and the loop carries on to
//! the next firing; there is no retry within a cycle.
//!
//! Job ids are unique. Scheduling an id that already exists cancels the old
//! loop and replaces it.
//!
//! # Example
//!
//! ```ignore
//! use wheatguard::scheduler::{DailyTrigger, Scheduler, StressScanJob, DAILY_SCAN_JOB_ID};
//!
//! let scheduler = Scheduler::new(shutdown_token.clone());
//! scheduler.schedule_daily(DAILY_SCAN_JOB_ID, DailyTrigger::new(2, 0)?, Arc::new(job));
//! ```

use super::trigger::{DailyTrigger, Trigger};
use super::types::ScheduledTask;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

struct JobEntry {
    trigger: Trigger,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Runs named jobs on their triggers until shut down.
pub struct Scheduler {
    jobs: Mutex<HashMap<String, JobEntry>>,
    shutdown: CancellationToken,
}

impl Scheduler {
    /// Creates a scheduler whose jobs all stop when `shutdown` is cancelled.
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            shutdown,
        }
    }

    /// Schedules a task at a fixed local time every day.
    ///
    /// Returns `true` if an existing job with the same id was replaced.
    pub fn schedule_daily(
        &self,
        id: &str,
        trigger: DailyTrigger,
        task: Arc<dyn ScheduledTask>,
    ) -> bool {
        self.schedule(id, Trigger::Daily(trigger), task)
    }

    /// Schedules a task on any trigger.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self, id: &str, trigger: Trigger, task: Arc<dyn ScheduledTask>) -> bool {
        let cancel = self.shutdown.child_token();
        let handle = tokio::spawn(run_job(
            id.to_string(),
            trigger,
            task,
            cancel.clone(),
        ));

        let previous = match self.jobs.lock() {
            Ok(mut jobs) => jobs.insert(
                id.to_string(),
                JobEntry {
                    trigger,
                    cancel,
                    handle,
                },
            ),
            Err(_) => {
                error!(job_id = id, "Scheduler job table poisoned");
                cancel.cancel();
                return false;
            }
        };

        match previous {
            Some(old) => {
                old.cancel.cancel();
                info!(job_id = id, trigger = %trigger, "Scheduled job replaced");
                true
            }
            None => {
                info!(job_id = id, trigger = %trigger, "Job scheduled");
                false
            }
        }
    }

    /// Stops a job. Returns `false` if no job had that id.
    pub fn cancel(&self, id: &str) -> bool {
        let removed = self.jobs.lock().ok().and_then(|mut jobs| jobs.remove(id));
        match removed {
            Some(entry) => {
                entry.cancel.cancel();
                debug!(job_id = id, "Job cancelled");
                true
            }
            None => false,
        }
    }

    /// Ids of scheduled jobs, sorted.
    pub fn job_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .jobs
            .lock()
            .map(|jobs| jobs.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// Trigger of a scheduled job.
    pub fn trigger(&self, id: &str) -> Option<Trigger> {
        self.jobs.lock().ok()?.get(id).map(|entry| entry.trigger)
    }

    /// Cancels every job and waits for their loops to exit.
    ///
    /// A run in progress finishes before its loop exits.
    pub async fn shutdown(&self) {
        let entries: Vec<JobEntry> = match self.jobs.lock() {
            Ok(mut jobs) => jobs.drain().map(|(_, entry)| entry).collect(),
            Err(_) => Vec::new(),
        };

        for entry in &entries {
            entry.cancel.cancel();
        }
        for entry in entries {
            let _ = entry.handle.await;
        }
        info!("Scheduler stopped");
    }
}

async fn run_job(
    id: String,
    trigger: Trigger,
    task: Arc<dyn ScheduledTask>,
    cancel: CancellationToken,
) {
    let mut last_fired: Option<DateTime<Local>> = None;
    loop {
        let (delay, fire_at) = trigger.next_firing(&Local::now(), last_fired.as_ref());
        debug!(job_id = %id, delay_secs = delay.as_secs(), "Waiting for next run");

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(job_id = %id, "Job loop exiting");
                break;
            }

            _ = tokio::time::sleep(delay) => {
                last_fired = fire_at;
                info!(job_id = %id, task = task.name(), "Running scheduled job");
                match task.run().await {
                    Ok(()) => info!(job_id = %id, "Scheduled job completed"),
                    Err(e) => error!(job_id = %id, error = %e, "Scheduled job failed"),
                }
            }
        }
    }
}
