//! High-level service facade for WheatGuard operations.
//!
//! This module provides a simplified API that encapsulates all component
//! wiring and configuration, following the Facade pattern.
//!
//! # Example
//!
//! ```ignore
//! use wheatguard::config::ConfigFile;
//! use wheatguard::service::{build_service, Stores};
//!
//! let service = build_service(&ConfigFile::load()?, Stores::in_memory()).await?;
//!
//! service.ingest_sample(45.0712, 7.6869, 0.71)?;
//! let scan = service.trigger_scan()?;
//! println!("{} alerts", scan.alerts_created);
//! ```

mod builder;
mod config;
mod error;
mod facade;
mod types;

pub use builder::{
    build_service, create_cache, create_http_client, create_provider, create_push_sender,
    service_config, DefaultService,
};
pub use config::{
    ServiceConfig, ServiceConfigBuilder, DEFAULT_HISTORY_LIMIT, DEFAULT_NEARBY_RADIUS_KM,
};
pub use error::ServiceError;
pub use facade::{parse_geojson_ring, Stores, WheatGuardService};
pub use types::{
    HistoryEntry, NearbyAlert, NearbyDetection, OutbreakOutcome, PointIndexResponse,
    PolygonIndexResponse, ScanResponse, NO_DATA_STATUS,
};
