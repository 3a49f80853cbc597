//! Configuration for ucms-migrate
//!
//! Sources, highest priority first: command line, environment, TOML file,
//! compiled defaults. See [`ServiceSettings::resolve`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use ucms_common::config::{env_non_empty, resolve_data_folder};
use ucms_common::Result;

use crate::services::image_compressor::DEFAULT_MAX_DIMENSION;

/// Config file name searched in the config directories
pub const CONFIG_FILE_NAME: &str = "ucms-migrate.toml";
/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:5780";
/// Legacy content repository
pub const DEFAULT_SOURCE_REPO_URL: &str = "https://github.com/ut-code/utcode.net.git";
/// Database file name inside the data folder
pub const DATABASE_FILE_NAME: &str = "ucms.db";

pub const ENV_CONFIG: &str = "UCMS_CONFIG";
pub const ENV_DATA_FOLDER: &str = "UCMS_DATA_FOLDER";
pub const ENV_ADMIN_TOKEN: &str = "UCMS_ADMIN_TOKEN";
pub const ENV_STORAGE_TOKEN: &str = "UCMS_STORAGE_TOKEN";
pub const ENV_SOURCE_REPO_URL: &str = "UCMS_SOURCE_REPO_URL";

/// `[storage]` section
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Base URL objects are PUT to
    pub endpoint: String,
    pub bucket: String,
    /// Public URL prefix of stored objects
    pub public_url: String,
    pub access_token: Option<String>,
}

impl StorageConfig {
    /// Both an upload endpoint and a public URL prefix are known
    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty() && !self.public_url.is_empty()
    }
}

/// `[images]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImagesConfig {
    pub max_dimension: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `ucms-migrate.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    pub bind: Option<String>,
    pub database_path: Option<PathBuf>,
    pub data_folder: Option<PathBuf>,
    pub source_repo_url: Option<String>,
    pub admin_token: Option<String>,
    pub temp_root: Option<PathBuf>,
    pub storage: StorageConfig,
    pub images: ImagesConfig,
    pub logging: LoggingConfig,
}

/// Command-line overrides
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub database: Option<PathBuf>,
}

/// Fully resolved service settings
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub bind: String,
    pub database_path: PathBuf,
    pub source_repo_url: String,
    /// `None` disables the admin gate
    pub admin_token: Option<String>,
    pub temp_root: PathBuf,
    pub storage: StorageConfig,
    pub max_dimension: u32,
    pub log_level: String,
}

impl ServiceSettings {
    /// Load the config file (if any) and merge all sources
    pub fn load(config_path: Option<&Path>, cli: &CliOverrides) -> Result<Self> {
        let config: MigrateConfig = ucms_common::config::load_toml_config(config_path)?;
        Ok(Self::resolve(config, cli))
    }

    /// Merge an already-parsed config with CLI and environment overrides
    pub fn resolve(config: MigrateConfig, cli: &CliOverrides) -> Self {
        let bind = cli
            .bind
            .clone()
            .or(config.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let database_path = match (&cli.database, &config.database_path) {
            (Some(path), _) => path.clone(),
            (None, Some(path)) if env_non_empty(ENV_DATA_FOLDER).is_none() => path.clone(),
            _ => resolve_data_folder(None, ENV_DATA_FOLDER, config.data_folder.as_deref())
                .join(DATABASE_FILE_NAME),
        };

        let source_repo_url = env_non_empty(ENV_SOURCE_REPO_URL)
            .or(config.source_repo_url)
            .unwrap_or_else(|| DEFAULT_SOURCE_REPO_URL.to_string());

        let admin_token = env_non_empty(ENV_ADMIN_TOKEN)
            .or(config.admin_token)
            .filter(|t| !t.trim().is_empty());

        let mut storage = config.storage;
        if let Some(token) = env_non_empty(ENV_STORAGE_TOKEN) {
            storage.access_token = Some(token);
        }
        if storage.public_url.is_empty() && !storage.endpoint.is_empty() {
            storage.public_url = format!(
                "{}/{}",
                storage.endpoint.trim_end_matches('/'),
                storage.bucket.trim_matches('/')
            );
        }

        Self {
            bind,
            database_path,
            source_repo_url,
            admin_token,
            temp_root: config.temp_root.unwrap_or_else(std::env::temp_dir),
            storage,
            max_dimension: config.images.max_dimension,
            log_level: config.logging.level,
        }
    }
}
