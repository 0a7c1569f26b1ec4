//! Configuration for WheatGuard.
//!
//! Settings live in `~/.wheatguard/config.ini`, one `[section]` per concern.
//! A missing file yields defaults, and every key can be read or updated by
//! name through [`ConfigKey`].
//!
//! # Example
//!
//! ```
//! use wheatguard::config::{ConfigFile, ConfigKey};
//!
//! let mut config = ConfigFile::default();
//! ConfigKey::PushRadiusKm.set(&mut config, "7.5").unwrap();
//! assert_eq!(config.push.radius_km, 7.5);
//! ```

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::*;
