//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod storage;
mod sync;

pub use storage::{PostgresConfig, SqliteConfig, StorageConfig, StorageType};
pub use sync::{CacheConfig, DialectConfig, NodeConfig, SyncConfig};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "syncmesh.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "SYNCMESH_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "SYNCMESH";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "SYNCMESH_LOG";

use serde::Deserialize;

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Local node identity.
    pub node: NodeConfig,
    /// Configuration synchronization settings.
    pub sync: SyncConfig,
    /// Cache settings.
    pub cache: CacheConfig,
    /// Database dialect capabilities.
    pub dialect: DialectConfig,
    /// Build version string used for the build epoch. Defaults to the crate version.
    pub version: Option<String>,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `syncmesh.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }

    /// The version string feeding the build epoch.
    pub fn build_version(&self) -> &str {
        self.version
            .as_deref()
            .unwrap_or(env!("CARGO_PKG_VERSION"))
    }
}
