//! WheatGuard - vegetation stress monitoring for wheat fields
//!
//! This library fetches vegetation index (NDVI) values from remote sensing
//! providers, detects sustained declines per location, and fans the
//! resulting alerts out to real-time subscribers and nearby devices.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```ignore
//! use wheatguard::config::ConfigFile;
//! use wheatguard::service::{build_service, Stores};
//!
//! let service = build_service(&ConfigFile::load()?, Stores::in_memory()).await?;
//! let point = service.point_index(45.0712, 7.6869, None).await?;
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod events;
pub mod fetcher;
pub mod logging;
pub mod provider;
pub mod push;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod stress;

/// Version of the WheatGuard library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
