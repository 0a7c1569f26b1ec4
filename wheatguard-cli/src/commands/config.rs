//! Configuration management CLI commands.
//!
//! Provides `config init`, `config path`, `config show`, `config get` and
//! `config set` for viewing and modifying settings from the command line.

use clap::Subcommand;
use wheatguard::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Create the configuration file with defaults if it does not exist
    Init,

    /// Show the configuration file path
    Path,

    /// Show all configuration settings
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., push.radius_km)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., push.radius_km)
        key: String,

        /// Value to set
        value: String,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init => run_init(),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'wheatguard config show' to see available keys.",
            key
        ))
    })
}

fn run_init() -> Result<(), CliError> {
    let path = config_file_path();
    if path.exists() {
        println!("Configuration already exists: {}", path.display());
        return Ok(());
    }
    let path = ConfigFile::ensure_exists()?;
    println!("Created {}", path.display());
    Ok(())
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

/// Show all settings, masking secrets.
fn run_show() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    print!("{}", render_settings(&config));
    Ok(())
}

fn run_get(key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = ConfigFile::load()?;
    let value = config_key.get(&config);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = ConfigFile::load()?;
    config_key
        .set(&mut config, value)
        .map_err(|e| CliError::Config(e.to_string()))?;
    config.save()?;

    println!("Set {} = {}", config_key.name(), display_value(config_key, value));
    Ok(())
}

fn display_value(key: ConfigKey, value: &str) -> String {
    if value.is_empty() {
        "(not set)".to_string()
    } else if key.is_secret() {
        "********".to_string()
    } else {
        value.to_string()
    }
}

/// Render every key grouped by section.
fn render_settings(config: &ConfigFile) -> String {
    let mut out = String::new();
    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();
        if section != current_section {
            if !current_section.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", section));
            current_section = section;
        }
        let value = key.get(config);
        out.push_str(&format!(
            "  {} = {}\n",
            key.key_name(),
            display_value(*key, &value)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_masks_secrets() {
        let mut config = ConfigFile::default();
        config.push.fcm_server_key = Some("very-secret".to_string());

        let text = render_settings(&config);
        assert!(text.contains("[push]"));
        assert!(text.contains("fcm_server_key = ********"));
        assert!(!text.contains("very-secret"));
        assert!(text.contains("sentinel_client_id = (not set)"));
        assert!(text.contains("type = modis"));
    }

    #[test]
    fn test_unknown_key() {
        assert!(matches!(parse_key("push.nope"), Err(CliError::Config(_))));
    }
}
