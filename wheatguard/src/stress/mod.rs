//! Vegetation stress detection
//!
//! Classification functions for absolute index values and relative drops,
//! and the [`StressScanner`] that turns sample history into alerts.

mod classify;
mod scanner;

pub use classify::{
    classify_drop, classify_index, StressSeverity, VegetationStatus, CRITICAL_DROP, HEALTHY_INDEX,
    HIGH_DROP, MODERATE_DROP, STRESSED_INDEX,
};
pub use scanner::{
    evaluate_history, ScanConfig, StressScanner, DEFAULT_HISTORY_WINDOW, DEFAULT_MIN_SAMPLES,
};
