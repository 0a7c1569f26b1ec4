//! Sample, alert and device storage
//!
//! The scanner, push dispatcher and service facade talk to storage through
//! the [`SampleStore`], [`AlertStore`], [`DeviceRegistry`] and
//! [`IncidentLog`] traits. [`MemoryStore`] implements them all in process.

mod memory;
mod traits;
mod types;

pub use memory::MemoryStore;
pub use traits::{AlertStore, DeviceRegistry, IncidentLog, SampleStore};
pub use types::{Device, IndexSample, NewStressAlert, StoreError, StressAlert};
