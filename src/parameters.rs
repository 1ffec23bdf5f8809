//! Runtime parameters.
//!
//! A key/value source consulted at the moment a decision is made, so a
//! provider backed by live configuration takes effect without a restart.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::config::Config;

/// Whether configuration tables are captured and forwarded.
pub const AUTO_SYNC_CONFIGURATION: &str = "auto.sync.configuration";

/// Source of parameter values.
pub trait ParameterService: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Boolean view of a parameter. `true`, `1`, `yes` and `on` are true;
    /// anything else, including a missing key, is false.
    fn is(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "on"
            )
        })
    }
}

/// In-memory parameters, seeded from [`Config`] and adjustable at runtime.
#[derive(Debug, Default)]
pub struct StaticParameters {
    values: RwLock<HashMap<String, String>>,
}

impl StaticParameters {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut values = config.sync.parameters.clone();
        values.insert(
            AUTO_SYNC_CONFIGURATION.to_string(),
            config.sync.auto_sync_configuration.to_string(),
        );
        Self::new(values)
    }

    pub fn set(&self, key: &str, value: &str) {
        let mut values = self
            .values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        values.insert(key.to_string(), value.to_string());
    }
}

impl ParameterService for StaticParameters {
    fn get(&self, key: &str) -> Option<String> {
        let values = self
            .values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        values.get(key).cloned()
    }
}
