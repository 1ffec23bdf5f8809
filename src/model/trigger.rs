//! Trigger (capture rule) records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BuildEpoch;

/// A capture rule binding one source table to one channel between a source
/// node group and a target node group.
///
/// Persisted triggers carry `last_modified`; virtual triggers built at
/// resolution time carry `build_epoch` instead. See [`Trigger::change_marker`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trigger {
    pub trigger_id: i64,
    pub source_catalog_name: Option<String>,
    pub source_schema_name: Option<String>,
    pub source_table_name: String,
    pub target_catalog_name: Option<String>,
    pub target_schema_name: Option<String>,
    pub target_table_name: Option<String>,
    pub source_group_id: String,
    pub target_group_id: String,
    pub channel_id: String,
    pub sync_on_insert: bool,
    pub sync_on_update: bool,
    pub sync_on_delete: bool,
    /// Capture changes that arrived through replication as well.
    pub sync_on_incoming_batch: bool,
    pub sync_column_level: bool,
    pub sync_on_insert_condition: Option<String>,
    pub sync_on_update_condition: Option<String>,
    pub sync_on_delete_condition: Option<String>,
    pub name_for_insert_trigger: Option<String>,
    pub name_for_update_trigger: Option<String>,
    pub name_for_delete_trigger: Option<String>,
    pub excluded_column_names: Option<String>,
    pub tx_id_expression: Option<String>,
    pub router_name: Option<String>,
    pub router_expression: Option<String>,
    pub initial_load_order: i64,
    pub initial_load_select: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub build_epoch: Option<BuildEpoch>,
    pub updated_by: Option<String>,
    pub inactive_time: Option<DateTime<Utc>>,
}

/// Structural identity of a trigger within a resolved set.
///
/// Table names compare case-insensitively; group and channel ids exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriggerKey {
    pub source_table_name: String,
    pub source_group_id: String,
    pub target_group_id: String,
    pub channel_id: String,
}

/// What the trigger-build engine compares to decide whether generated DDL
/// is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeMarker {
    Modified(DateTime<Utc>),
    Epoch(BuildEpoch),
    Unknown,
}

impl Trigger {
    pub fn key(&self) -> TriggerKey {
        TriggerKey {
            source_table_name: self.source_table_name.to_lowercase(),
            source_group_id: self.source_group_id.clone(),
            target_group_id: self.target_group_id.clone(),
            channel_id: self.channel_id.clone(),
        }
    }

    /// Two triggers are the same rule when their keys match, regardless of
    /// every other attribute.
    pub fn is_same(&self, other: &Trigger) -> bool {
        self.key() == other.key()
    }

    pub fn is_active(&self) -> bool {
        self.inactive_time.is_none()
    }

    /// Whether any of the three capture flags is set.
    pub fn captures_changes(&self) -> bool {
        self.sync_on_insert || self.sync_on_update || self.sync_on_delete
    }

    pub fn change_marker(&self) -> ChangeMarker {
        match (self.build_epoch, self.last_modified) {
            (Some(epoch), _) => ChangeMarker::Epoch(epoch),
            (None, Some(modified)) => ChangeMarker::Modified(modified),
            (None, None) => ChangeMarker::Unknown,
        }
    }
}
