//! Periodic stress scan over grouped sample history.
//!
//! Each scan replaces the whole unresolved alert set. The delete and the
//! following inserts are not atomic: if an insert fails partway the active
//! set stays incomplete until the next scan rebuilds it.

use super::classify::classify_drop;
use crate::coord::round_to;
use crate::store::{AlertStore, IndexSample, NewStressAlert, SampleStore, StoreError};
use std::sync::Arc;
use tracing::{debug, info};

/// Samples considered per location, newest first.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Fewest samples a location needs before it is evaluated.
pub const DEFAULT_MIN_SAMPLES: usize = 3;

/// Decimal places for baseline, current and drop on stored alerts.
const ALERT_PRECISION: i32 = 3;

/// Scan tuning.
#[derive(Debug, Clone, Copy)]
pub struct ScanConfig {
    pub history_window: usize,
    pub min_samples: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

/// Evaluates one location's history, newest sample first.
///
/// Returns the alert to create, or `None` when history is too short or the
/// drop does not reach the lowest severity.
pub fn evaluate_history(history: &[IndexSample], min_samples: usize) -> Option<NewStressAlert> {
    if history.len() < min_samples.max(2) {
        return None;
    }

    let (latest, older) = history.split_first()?;
    let baseline = older.iter().map(|s| s.value).sum::<f64>() / older.len() as f64;
    let drop = baseline - latest.value;
    let severity = classify_drop(drop)?;

    Some(NewStressAlert {
        coord: latest.coord,
        baseline: round_to(baseline, ALERT_PRECISION),
        current: round_to(latest.value, ALERT_PRECISION),
        drop: round_to(drop, ALERT_PRECISION),
        severity,
    })
}

/// Compares each location's latest sample against its rolling baseline.
pub struct StressScanner {
    samples: Arc<dyn SampleStore>,
    alerts: Arc<dyn AlertStore>,
    config: ScanConfig,
}

impl StressScanner {
    pub fn new(samples: Arc<dyn SampleStore>, alerts: Arc<dyn AlertStore>) -> Self {
        Self {
            samples,
            alerts,
            config: ScanConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Rebuilds the active alert set and returns how many alerts were created.
    pub fn scan(&self) -> Result<usize, StoreError> {
        let cleared = self.alerts.delete_unresolved()?;
        let locations = self.samples.locations()?;

        let mut created = 0;
        for location in &locations {
            let history = self.samples.recent(*location, self.config.history_window)?;
            let Some(alert) = evaluate_history(&history, self.config.min_samples) else {
                continue;
            };

            debug!(
                location = %location,
                baseline = alert.baseline,
                current = alert.current,
                severity = %alert.severity,
                "Stress detected"
            );
            self.alerts.insert(alert)?;
            created += 1;
        }

        info!(
            locations = locations.len(),
            cleared = cleared,
            created = created,
            "Stress scan complete"
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::store::{MemoryStore, StressAlert};
    use crate::stress::StressSeverity;

    fn point() -> Coordinate {
        Coordinate::new(30.7333, 76.7794).unwrap()
    }

    fn scanner_with(values: &[f64]) -> (Arc<MemoryStore>, StressScanner) {
        let store = Arc::new(MemoryStore::new());
        for value in values {
            store.append(point(), *value).unwrap();
        }
        let scanner = StressScanner::new(store.clone(), store.clone());
        (store, scanner)
    }

    fn active(store: &MemoryStore) -> Vec<StressAlert> {
        AlertStore::unresolved(store).unwrap()
    }

    #[test]
    fn test_sustained_decline_is_high() {
        let (store, scanner) =
            scanner_with(&[0.78, 0.76, 0.74, 0.71, 0.70, 0.68, 0.45, 0.40]);

        assert_eq!(scanner.scan().unwrap(), 1);

        let alerts = active(&store);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, StressSeverity::High);
        assert_eq!(alerts[0].current, 0.4);
        assert_eq!(alerts[0].baseline, 0.689);
        assert_eq!(alerts[0].drop, 0.289);
        assert!(!alerts[0].resolved);
    }

    #[test]
    fn test_too_few_samples_never_alert() {
        let (store, scanner) = scanner_with(&[0.9, 0.1]);
        assert_eq!(scanner.scan().unwrap(), 0);
        assert!(active(&store).is_empty());
    }

    #[test]
    fn test_improvement_produces_nothing() {
        let (_, scanner) = scanner_with(&[0.3, 0.3, 0.8]);
        assert_eq!(scanner.scan().unwrap(), 0);
    }

    #[test]
    fn test_only_last_ten_samples_count() {
        // twenty old low readings fall outside the window
        let mut values = vec![0.1; 20];
        values.extend([0.8; 9]);
        values.push(0.3);
        let (store, scanner) = scanner_with(&values);

        scanner.scan().unwrap();
        let alerts = active(&store);
        assert_eq!(alerts[0].baseline, 0.8);
        assert_eq!(alerts[0].severity, StressSeverity::Critical);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let (store, scanner) =
            scanner_with(&[0.78, 0.76, 0.74, 0.71, 0.70, 0.68, 0.45, 0.40]);
        store.append(Coordinate::new(10.0, 10.0).unwrap(), 0.8).unwrap();
        store.append(Coordinate::new(10.0, 10.0).unwrap(), 0.8).unwrap();
        store.append(Coordinate::new(10.0, 10.0).unwrap(), 0.6).unwrap();

        let first = scanner.scan().unwrap();
        let first_severities: Vec<_> = active(&store).iter().map(|a| a.severity).collect();
        let second = scanner.scan().unwrap();
        let second_severities: Vec<_> = active(&store).iter().map(|a| a.severity).collect();

        assert_eq!(first, 2);
        assert_eq!(first, second);
        assert_eq!(active(&store).len(), 2);
        let mut a = first_severities;
        let mut b = second_severities;
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_recovered_location_alert_is_cleared() {
        let (store, scanner) = scanner_with(&[0.8, 0.8, 0.3]);
        assert_eq!(scanner.scan().unwrap(), 1);

        store.append(point(), 0.8).unwrap();
        assert_eq!(scanner.scan().unwrap(), 0);
        assert!(active(&store).is_empty());
    }

    #[test]
    fn test_resolved_alerts_survive_scan() {
        let (store, scanner) = scanner_with(&[0.8, 0.8, 0.3]);
        scanner.scan().unwrap();
        let id = active(&store)[0].id;
        store.resolve(id).unwrap();

        scanner.scan().unwrap();
        assert_eq!(store.all_alerts().unwrap().len(), 2);
        assert_eq!(active(&store).len(), 1);
    }

    #[test]
    fn test_min_samples_is_configurable() {
        let (_, scanner) = scanner_with(&[0.8, 0.8, 0.3]);
        let scanner = scanner.with_config(ScanConfig {
            history_window: 10,
            min_samples: 4,
        });
        assert_eq!(scanner.scan().unwrap(), 0);
    }
}
