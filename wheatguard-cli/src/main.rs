//! WheatGuard CLI - Command-line interface
//!
//! Vegetation index queries, stress scans and the scheduling daemon.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::config::ConfigCommands;
use commands::ndvi::NdviCommands;
use commands::run::RunArgs;
use commands::scan::ScanArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "wheatguard")]
#[command(about = "Crop stress monitoring from satellite vegetation indices", long_about = None)]
#[command(version = wheatguard::VERSION)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Query vegetation index values
    Ndvi {
        #[command(subcommand)]
        command: NdviCommands,
    },

    /// Scan a samples file once and print the active stress alerts
    Scan {
        /// JSON array of {lat, lon, value} samples, oldest first
        #[arg(long)]
        samples: PathBuf,
    },

    /// Run the daemon with the daily stress scan until Ctrl-C
    Run {
        /// JSON array of samples to preload, oldest first
        #[arg(long)]
        samples: Option<PathBuf>,

        /// Run one scan immediately after startup
        #[arg(long)]
        scan_now: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        e.exit();
    }
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let debug = cli.debug;
    match cli.command {
        Commands::Config { command } => commands::config::run(command),
        Commands::Ndvi { command } => commands::ndvi::run(command, debug).await,
        Commands::Scan { samples } => commands::scan::run(ScanArgs { samples, debug }).await,
        Commands::Run { samples, scan_now } => {
            commands::run::run(RunArgs {
                samples,
                scan_now,
                debug,
            })
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ndvi_point() {
        let cli = Cli::try_parse_from([
            "wheatguard",
            "ndvi",
            "point",
            "--lat",
            "30.9",
            "--lon",
            "-75.85",
            "--date",
            "2024-01-20",
        ])
        .unwrap();

        match cli.command {
            Commands::Ndvi {
                command: NdviCommands::Point { lat, lon, date },
            } => {
                assert_eq!(lat, 30.9);
                assert_eq!(lon, -75.85);
                assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2024, 1, 20));
            }
            _ => panic!("expected ndvi point"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        let result = Cli::try_parse_from([
            "wheatguard",
            "ndvi",
            "point",
            "--lat",
            "1",
            "--lon",
            "2",
            "--date",
            "20-01-2024",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_run_with_global_debug() {
        let cli = Cli::try_parse_from(["wheatguard", "run", "--scan-now", "--debug"]).unwrap();
        assert!(cli.debug);
        match cli.command {
            Commands::Run { samples, scan_now } => {
                assert!(samples.is_none());
                assert!(scan_now);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_scan_requires_samples() {
        assert!(Cli::try_parse_from(["wheatguard", "scan"]).is_err());
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::try_parse_from([
            "wheatguard",
            "config",
            "set",
            "push.radius_km",
            "10",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Set { .. }
            }
        ));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
