//! Two independent classification schemes.
//!
//! [`classify_drop`] rates a relative decline against a location's own
//! baseline and drives alert creation. [`classify_index`] rates an absolute
//! index value for display. They share no thresholds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Drop above which a decline is critical.
pub const CRITICAL_DROP: f64 = 0.35;
/// Drop above which a decline is high.
pub const HIGH_DROP: f64 = 0.20;
/// Drop above which a decline is worth an alert at all.
pub const MODERATE_DROP: f64 = 0.10;

/// Index at or above which vegetation is healthy.
pub const HEALTHY_INDEX: f64 = 0.4;
/// Index at or above which vegetation is stressed rather than critical.
pub const STRESSED_INDEX: f64 = 0.2;

/// Severity of a detected decline, ordered `Moderate < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StressSeverity {
    Moderate,
    High,
    Critical,
}

impl fmt::Display for StressSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Critical => "Critical",
        };
        f.write_str(label)
    }
}

/// Classifies a drop (baseline minus current).
///
/// Thresholds are strict: a drop of exactly 0.20 is `Moderate`, not `High`.
/// Returns `None` when the drop is too small to alert on, including any
/// improvement (negative drop).
pub fn classify_drop(drop: f64) -> Option<StressSeverity> {
    if drop > CRITICAL_DROP {
        Some(StressSeverity::Critical)
    } else if drop > HIGH_DROP {
        Some(StressSeverity::High)
    } else if drop > MODERATE_DROP {
        Some(StressSeverity::Moderate)
    } else {
        None
    }
}

/// Absolute vegetation health tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VegetationStatus {
    Healthy,
    Stressed,
    Critical,
}

impl fmt::Display for VegetationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Healthy => "Healthy",
            Self::Stressed => "Stressed",
            Self::Critical => "Critical",
        };
        f.write_str(label)
    }
}

/// Classifies an absolute index value (inclusive lower bounds).
pub fn classify_index(value: f64) -> VegetationStatus {
    if value >= HEALTHY_INDEX {
        VegetationStatus::Healthy
    } else if value >= STRESSED_INDEX {
        VegetationStatus::Stressed
    } else {
        VegetationStatus::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_thresholds_are_strict() {
        assert_eq!(classify_drop(0.35), Some(StressSeverity::High));
        assert_eq!(classify_drop(0.20), Some(StressSeverity::Moderate));
        assert_eq!(classify_drop(0.10), None);
    }

    #[test]
    fn test_drop_tiers() {
        assert_eq!(classify_drop(0.36), Some(StressSeverity::Critical));
        assert_eq!(classify_drop(0.2886), Some(StressSeverity::High));
        assert_eq!(classify_drop(0.11), Some(StressSeverity::Moderate));
        assert_eq!(classify_drop(-0.3), None);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(StressSeverity::Critical > StressSeverity::High);
        assert!(StressSeverity::High > StressSeverity::Moderate);
    }

    #[test]
    fn test_index_tiers_are_inclusive() {
        assert_eq!(classify_index(0.4), VegetationStatus::Healthy);
        assert_eq!(classify_index(0.399), VegetationStatus::Stressed);
        assert_eq!(classify_index(0.2), VegetationStatus::Stressed);
        assert_eq!(classify_index(0.19), VegetationStatus::Critical);
        assert_eq!(classify_index(-0.5), VegetationStatus::Critical);
    }

    #[test]
    fn test_labels() {
        assert_eq!(StressSeverity::High.to_string(), "High");
        assert_eq!(VegetationStatus::Stressed.to_string(), "Stressed");
        assert_eq!(serde_json::to_string(&StressSeverity::Critical).unwrap(), "\"Critical\"");
    }
}
