//! Vegetation index queries.

use chrono::NaiveDate;
use clap::Subcommand;
use std::path::PathBuf;
use wheatguard::service::Stores;

use super::common::{parse_date, print_json, read_file};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Ndvi subcommands.
#[derive(Debug, Subcommand)]
pub enum NdviCommands {
    /// Index value at one coordinate
    Point {
        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Observation date (YYYY-MM-DD); today when omitted
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Index averaged over a GeoJSON polygon's vertices
    Polygon {
        /// GeoJSON Feature or Polygon file; positions are [lat, lon]
        #[arg(long)]
        geojson: PathBuf,

        /// Observation date (YYYY-MM-DD); today when omitted
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

/// Run an ndvi subcommand.
pub async fn run(command: NdviCommands, debug: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(debug, false)?;
    runner.log_startup("ndvi");
    let service = runner.create_service(Stores::in_memory()).await?;

    match command {
        NdviCommands::Point { lat, lon, date } => {
            let response = service.point_index(lat, lon, date).await?;
            print_json(&response)
        }
        NdviCommands::Polygon { geojson, date } => {
            let content = read_file(&geojson)?;
            let value: serde_json::Value = serde_json::from_str(&content)
                .map_err(|e| CliError::Input(format!("{}: {}", geojson.display(), e)))?;
            let response = service.polygon_index_geojson(&value, date).await?;
            print_json(&response)
        }
    }
}
