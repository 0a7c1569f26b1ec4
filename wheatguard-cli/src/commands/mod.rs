//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (init, path, show, get, set)
//! - [`ndvi`] - Point and polygon index queries
//! - [`scan`] - One-shot stress scan over a samples file
//! - [`run`] - Daemon with the daily scheduled scan

pub mod common;
pub mod config;
pub mod ndvi;
pub mod run;
pub mod scan;
