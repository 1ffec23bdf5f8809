//! Node, synchronization, cache and dialect settings.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::model::{TABLE_NODE, TABLE_NODE_SECURITY};

/// Identity of the local node.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub group_id: String,
    pub node_id: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            group_id: "default".to_string(),
            node_id: "00000".to_string(),
        }
    }
}

/// Configuration synchronization settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Prefix of the replication system's own tables.
    pub table_prefix: String,
    /// Un-prefixed names of the configuration tables replicated to linked
    /// groups, in initial load order.
    pub config_tables: Vec<String>,
    /// Initial load predicate per un-prefixed configuration table.
    pub initial_load_selects: HashMap<String, String>,
    /// Whether configuration changes are captured at all.
    pub auto_sync_configuration: bool,
    /// Additional free-form parameters.
    pub parameters: HashMap<String, String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            table_prefix: "sym".to_string(),
            config_tables: [
                "node_group",
                "node_group_link",
                TABLE_NODE,
                TABLE_NODE_SECURITY,
                "channel",
                "trigger",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            initial_load_selects: HashMap::new(),
            auto_sync_configuration: true,
            parameters: HashMap::new(),
        }
    }
}

/// Cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum age of the channel snapshot.
    pub channel_ttl_secs: u64,
}

impl CacheConfig {
    pub fn channel_ttl(&self) -> Duration {
        Duration::from_secs(self.channel_ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            channel_ttl_secs: 60,
        }
    }
}

/// Database dialect capabilities.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DialectConfig {
    /// The database does not distinguish catalog from schema; a trigger
    /// without a source catalog takes its schema as catalog.
    pub catalog_equals_schema: bool,
}
