//! One-shot stress scan over a samples file.

use std::path::PathBuf;
use tracing::info;
use wheatguard::service::Stores;

use super::common::{ingest_samples, load_samples, print_json};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the scan command.
pub struct ScanArgs {
    pub samples: PathBuf,
    pub debug: bool,
}

/// Load the samples, scan once and print the active alerts as JSON.
pub async fn run(args: ScanArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.debug, false)?;
    runner.log_startup("scan");

    let records = load_samples(&args.samples)?;
    let service = runner.create_service(Stores::in_memory()).await?;
    let ingested = ingest_samples(&service, &records)?;

    let response = service.trigger_scan()?;
    info!(
        samples = ingested,
        alerts_created = response.alerts_created,
        "Scan finished"
    );

    print_json(&service.active_alerts()?)
}
