//! Trigger history snapshots.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a trigger was (re)built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerRebuildReason {
    NewTriggers,
    TableSchemaChanged,
    TableSyncConfigurationChanged,
    Forced,
    TriggersMissing,
}

impl TriggerRebuildReason {
    /// Single-character code stored in the history table.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NewTriggers => "N",
            Self::TableSchemaChanged => "S",
            Self::TableSyncConfigurationChanged => "C",
            Self::Forced => "F",
            Self::TriggersMissing => "T",
        }
    }
}

impl FromStr for TriggerRebuildReason {
    type Err = String;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code.trim() {
            "N" => Ok(Self::NewTriggers),
            "S" => Ok(Self::TableSchemaChanged),
            "C" => Ok(Self::TableSyncConfigurationChanged),
            "F" => Ok(Self::Forced),
            "T" => Ok(Self::TriggersMissing),
            other => Err(format!("unknown rebuild reason code '{}'", other)),
        }
    }
}

impl fmt::Display for TriggerRebuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Immutable snapshot of a captured table's structure at trigger-build time.
///
/// Created once per build or schema change, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerHistory {
    /// Assigned by the store on insert; ignored when inserting.
    pub trigger_history_id: i64,
    pub trigger_id: i64,
    pub source_table_name: String,
    pub table_hash: i64,
    pub create_time: DateTime<Utc>,
    /// Comma separated.
    pub column_names: String,
    /// Comma separated.
    pub pk_column_names: String,
    pub last_trigger_build_reason: TriggerRebuildReason,
    pub name_for_insert_trigger: Option<String>,
    pub name_for_update_trigger: Option<String>,
    pub name_for_delete_trigger: Option<String>,
    pub source_schema_name: Option<String>,
    pub source_catalog_name: Option<String>,
    pub trigger_row_hash: i64,
}

impl TriggerHistory {
    pub fn column_names(&self) -> Vec<&str> {
        split_columns(&self.column_names)
    }

    pub fn pk_column_names(&self) -> Vec<&str> {
        split_columns(&self.pk_column_names)
    }
}

fn split_columns(columns: &str) -> Vec<&str> {
    columns
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}
