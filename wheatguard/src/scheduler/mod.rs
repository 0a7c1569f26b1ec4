//! Scheduled jobs
//!
//! [`Scheduler`] runs named [`ScheduledTask`]s on a [`Trigger`]. The only
//! production job is [`StressScanJob`], registered daily under
//! [`DAILY_SCAN_JOB_ID`].

mod daemon;
mod job;
mod trigger;
mod types;

pub use daemon::Scheduler;
pub use job::{StressScanJob, DAILY_SCAN_JOB_ID};
pub use trigger::{DailyTrigger, Trigger};
pub use types::{JobError, ScheduledTask, TaskFuture};
