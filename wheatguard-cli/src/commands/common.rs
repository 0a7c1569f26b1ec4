//! Shared helpers for command handlers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CliError;
use wheatguard::service::DefaultService;

/// One historical reading in a samples file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SampleRecord {
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

/// Parse a `YYYY-MM-DD` date argument.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date in YYYY-MM-DD form", value))
}

/// Read a whole file into a string.
pub fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|error| CliError::FileRead {
        path: path.display().to_string(),
        error,
    })
}

/// Load a JSON array of `{lat, lon, value}` records, oldest first.
pub fn load_samples(path: &Path) -> Result<Vec<SampleRecord>, CliError> {
    let content = read_file(path)?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::Input(format!("{}: {}", path.display(), e)))
}

/// Ingest records in file order. Returns the number stored.
pub fn ingest_samples(service: &DefaultService, records: &[SampleRecord]) -> Result<usize, CliError> {
    for record in records {
        service.ingest_sample(record.lat, record.lon, record.value)?;
    }
    Ok(records.len())
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Input(format!("cannot encode output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-01-20").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
        );
        assert!(parse_date("20/01/2024").is_err());
    }

    #[test]
    fn test_load_samples() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("samples.json");
        std::fs::write(
            &path,
            r#"[{"lat": 30.9, "lon": 75.85, "value": 0.71}, {"lat": 30.9, "lon": 75.85, "value": 0.4}]"#,
        )
        .unwrap();

        let records = load_samples(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].value, 0.4);
    }

    #[test]
    fn test_load_samples_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_samples(&missing),
            Err(CliError::FileRead { .. })
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"lat": 1}"#).unwrap();
        assert!(matches!(load_samples(&bad), Err(CliError::Input(_))));
    }
}
