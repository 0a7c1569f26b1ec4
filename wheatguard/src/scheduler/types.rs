//! Scheduler types.

use crate::store::StoreError;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Failure of a scheduled job run or of scheduling itself.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid daily trigger {hour:02}:{minute:02}")]
    InvalidTrigger { hour: u32, minute: u32 },

    #[error("stress scan failed: {0}")]
    Scan(#[from] StoreError),

    #[error("job failed: {0}")]
    Failed(String),
}

/// Boxed future returned by a task run.
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<(), JobError>> + Send>>;

/// Work the scheduler runs on each firing.
pub trait ScheduledTask: Send + Sync + 'static {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Starts one run.
    fn run(&self) -> TaskFuture;
}
