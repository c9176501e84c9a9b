//! Configuration loading and data folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Optional TOML configuration file contents.
///
/// Every field has a default; a missing or partial file never prevents
/// startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub data_folder: Option<String>,
    pub port: Option<u16>,
    pub redis_url: Option<String>,
    pub request_channel: Option<String>,
    pub response_channel: Option<String>,
}

impl TomlConfig {
    /// Load the config file from the platform config directory, if present.
    ///
    /// Looks for `closetd/config.toml` under the user config directory, then
    /// `/etc/closetd/config.toml` on Linux. Absence is not an error.
    pub fn load() -> Result<Option<TomlConfig>> {
        let Some(path) = config_file_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Some(config))
    }
}

fn config_file_path() -> Option<PathBuf> {
    if let Some(dir) = dirs::config_dir() {
        let user_config = dir.join("closetd").join("config.toml");
        if user_config.exists() {
            return Some(user_config);
        }
    }
    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/closetd/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }
    None
}

/// Resolve the data folder (SQLite database plus image directory) by
/// priority order:
/// 1. Command-line argument
/// 2. Environment variable (already merged into the cli value by clap)
/// 3. TOML config file
/// 4. OS-dependent default
pub fn resolve_data_folder(cli_arg: Option<&str>, file_config: Option<&TomlConfig>) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }
    if let Some(path) = file_config.and_then(|c| c.data_folder.as_deref()) {
        return PathBuf::from(path);
    }
    default_data_folder()
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("closetd"))
        .unwrap_or_else(|| PathBuf::from("./closetd_data"))
}
