//! Virtual configuration triggers.
//!
//! Every link in the topology implies capture rules on the replication
//! system's own configuration tables. Those rules are never stored; they are
//! rebuilt on each resolution with identities every node derives the same way.

use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::config::SyncConfig;
use crate::model::{prefixed_table, BuildEpoch, Trigger, CHANNEL_CONFIG, NODE_TABLES, TABLE_NODE};
use crate::parameters::{ParameterService, AUTO_SYNC_CONFIGURATION};

/// The root configuration tables, prefixed, in initial load order.
#[derive(Debug, Clone)]
pub struct ConfigTables {
    prefix: String,
    tables: Vec<String>,
    initial_load_selects: HashMap<String, String>,
}

impl ConfigTables {
    /// `tables` are un-prefixed names.
    pub fn new<I, S>(prefix: &str, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefix: prefix.to_string(),
            tables: tables
                .into_iter()
                .map(|t| prefixed_table(prefix, t.as_ref()))
                .collect(),
            initial_load_selects: HashMap::new(),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        config.initial_load_selects.iter().fold(
            Self::new(&config.table_prefix, &config.config_tables),
            |tables, (table, select)| tables.with_initial_load_select(table, select),
        )
    }

    /// Attach an initial load predicate to the un-prefixed `table`.
    pub fn with_initial_load_select(mut self, table: &str, select: &str) -> Self {
        self.initial_load_selects
            .insert(prefixed_table(&self.prefix, table), select.to_string());
        self
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// The prefixed node table, captured for every PUSH link.
    pub fn node_table(&self) -> String {
        prefixed_table(&self.prefix, TABLE_NODE)
    }

    /// Whether `table` holds node bookkeeping and must never be captured.
    pub fn is_node_table(&self, table: &str) -> bool {
        NODE_TABLES
            .iter()
            .any(|t| prefixed_table(&self.prefix, t).eq_ignore_ascii_case(table))
    }

    fn initial_load_select(&self, table: &str) -> Option<String> {
        self.initial_load_selects.get(table).cloned()
    }
}

/// Identity of a virtual trigger.
///
/// Depends only on the table and target group, so every node computes the
/// same id for the same logical trigger. Always non-negative.
pub fn virtual_trigger_id(table_name: &str, target_group_id: &str) -> i64 {
    let mut hasher = Sha256::new();
    hasher.update(table_name.as_bytes());
    hasher.update([0u8]);
    hasher.update(target_group_id.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&digest[..4]);
    i64::from(u32::from_be_bytes(bytes) & 0x7fff_ffff)
}

/// Builds the virtual triggers implied by the topology.
pub struct VirtualTriggerBuilder {
    tables: ConfigTables,
    parameters: Arc<dyn ParameterService>,
    epoch: BuildEpoch,
}

impl VirtualTriggerBuilder {
    pub fn new(tables: ConfigTables, parameters: Arc<dyn ParameterService>, version: &str) -> Self {
        Self {
            tables,
            parameters,
            epoch: BuildEpoch::from_version(version),
        }
    }

    pub fn build_epoch(&self) -> BuildEpoch {
        self.epoch
    }

    pub fn config_tables(&self) -> &ConfigTables {
        &self.tables
    }

    /// Build one configuration-channel trigger.
    ///
    /// The capture flags are only set when `sync_changes` is true and
    /// configuration auto-sync is enabled at the time of the call. The
    /// trigger has no initial load position; `registration_triggers`
    /// assigns one.
    pub fn build_config_trigger(
        &self,
        table_name: &str,
        sync_changes: bool,
        source_group_id: &str,
        target_group_id: &str,
    ) -> Trigger {
        let capture = sync_changes && self.parameters.is(AUTO_SYNC_CONFIGURATION);
        Trigger {
            trigger_id: virtual_trigger_id(table_name, target_group_id),
            source_table_name: table_name.to_string(),
            source_group_id: source_group_id.to_string(),
            target_group_id: target_group_id.to_string(),
            channel_id: CHANNEL_CONFIG.to_string(),
            sync_on_insert: capture,
            sync_on_update: capture,
            sync_on_delete: capture,
            sync_on_incoming_batch: true,
            initial_load_order: 0,
            initial_load_select: self.tables.initial_load_select(table_name),
            build_epoch: Some(self.epoch),
            ..Default::default()
        }
    }

    /// One trigger per root configuration table for the link
    /// `source_group_id -> target_group_id`, numbered in load order from 1.
    pub fn registration_triggers(&self, source_group_id: &str, target_group_id: &str) -> Vec<Trigger> {
        self.tables
            .tables()
            .iter()
            .zip(1..)
            .map(|(table, load_order)| {
                let sync_changes = !self.tables.is_node_table(table);
                Trigger {
                    initial_load_order: load_order,
                    ..self.build_config_trigger(table, sync_changes, source_group_id, target_group_id)
                }
            })
            .collect()
    }

    /// The trigger that carries node identity records over a PUSH link.
    pub fn node_identity_trigger(&self, source_group_id: &str, target_group_id: &str) -> Trigger {
        self.build_config_trigger(
            &self.tables.node_table(),
            false,
            source_group_id,
            target_group_id,
        )
    }
}
