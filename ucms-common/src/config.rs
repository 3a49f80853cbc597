//! Configuration file location, TOML loading and data folder resolution
//!
//! Resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user or system-wide config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Application directory name used under the platform config/data dirs
pub const APP_DIR_NAME: &str = "ucms";

/// Locate the TOML configuration file for a service
///
/// Returns `None` when no candidate exists. A missing config file is not an
/// error: services fall back to compiled defaults.
///
/// # Arguments
/// * `cli_arg` - `--config` value, if given
/// * `env_var_name` - environment variable that may hold a path (e.g. `UCMS_CONFIG`)
/// * `file_name` - file name searched in the config directories (e.g. `ucms-migrate.toml`)
pub fn locate_config_file(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    file_name: &str,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument (returned even if missing so the
    // loader reports the bad path instead of silently using defaults)
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: per-user config, then system-wide config
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(file_name));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc").join(APP_DIR_NAME).join(file_name);
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Load and deserialize a TOML config file, or defaults when `path` is `None`
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        warn!("No configuration file found, using built-in defaults");
        return Ok(T::default());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Resolve the data folder (database location) for a service
///
/// # Arguments
/// * `cli_arg` - explicit folder from the command line
/// * `env_var_name` - environment variable override (e.g. `UCMS_DATA_FOLDER`)
/// * `config_value` - folder from the TOML config, if any
pub fn resolve_data_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config_value: Option<&Path>,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = config_value {
        return path.to_path_buf();
    }

    default_data_folder()
}

/// Get OS-dependent default data folder path
pub fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/ucms (or /var/lib/ucms for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("/var/lib/ucms"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/ucms"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\ucms"))
    } else {
        PathBuf::from("./ucms_data")
    }
}

/// Read a non-empty environment variable
pub fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
