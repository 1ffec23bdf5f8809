//! Typed decoding of stored rows into model records.
//!
//! Backends expose their rows through [`RecordRow`]; the `decode_*`
//! functions validate at the boundary and turn column-level problems into
//! [`StorageError::InvalidRecord`].

use chrono::{DateTime, Utc};

use super::{Result, StorageError};
use crate::model::{
    Channel, DataEventAction, NodeChannel, NodeGroupLink, Trigger, TriggerHistory,
    TriggerRebuildReason,
};

/// Column access common to every backend row type.
///
/// Both methods return `Ok(None)` for SQL NULL and an error only when the
/// column is missing or has an incompatible type.
pub trait RecordRow {
    fn text(&self, column: &str) -> Result<Option<String>>;
    fn int(&self, column: &str) -> Result<Option<i64>>;
}

#[cfg(feature = "sqlite")]
impl RecordRow for sqlx::sqlite::SqliteRow {
    fn text(&self, column: &str) -> Result<Option<String>> {
        use sqlx::Row;
        Ok(self.try_get(column)?)
    }

    fn int(&self, column: &str) -> Result<Option<i64>> {
        use sqlx::Row;
        Ok(self.try_get(column)?)
    }
}

#[cfg(feature = "postgres")]
impl RecordRow for sqlx::postgres::PgRow {
    fn text(&self, column: &str) -> Result<Option<String>> {
        use sqlx::Row;
        Ok(self.try_get(column)?)
    }

    fn int(&self, column: &str) -> Result<Option<i64>> {
        use sqlx::Row;
        Ok(self.try_get(column)?)
    }
}

fn required_text<R: RecordRow + ?Sized>(row: &R, column: &str) -> Result<String> {
    row.text(column)?
        .ok_or_else(|| StorageError::invalid(column, "required value is NULL"))
}

fn required_int<R: RecordRow + ?Sized>(row: &R, column: &str) -> Result<i64> {
    row.int(column)?
        .ok_or_else(|| StorageError::invalid(column, "required value is NULL"))
}

/// NULL and blank strings both decode to `None`.
fn non_blank<R: RecordRow + ?Sized>(row: &R, column: &str) -> Result<Option<String>> {
    Ok(row.text(column)?.filter(|v| !v.trim().is_empty()))
}

/// 0/1 integer flag; NULL reads as false.
fn flag<R: RecordRow + ?Sized>(row: &R, column: &str) -> Result<bool> {
    Ok(row.int(column)?.is_some_and(|v| v == 1))
}

fn timestamp<R: RecordRow + ?Sized>(row: &R, column: &str) -> Result<Option<DateTime<Utc>>> {
    row.text(column)?
        .map(|raw| parse_timestamp(column, &raw))
        .transpose()
}

pub(crate) fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StorageError::invalid(column, format!("bad timestamp '{}': {}", raw, e)))
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Decode a trigger row.
///
/// With `catalog_equals_schema`, a row that has a source schema but no
/// source catalog gets the schema copied into the catalog.
pub fn decode_trigger<R: RecordRow + ?Sized>(row: &R, catalog_equals_schema: bool) -> Result<Trigger> {
    let source_schema_name = row.text("source_schema_name")?;
    let mut source_catalog_name = row.text("source_catalog_name")?;
    if catalog_equals_schema && source_catalog_name.is_none() {
        source_catalog_name = source_schema_name.clone();
    }

    Ok(Trigger {
        trigger_id: required_int(row, "trigger_id")?,
        source_catalog_name,
        source_schema_name,
        source_table_name: required_text(row, "source_table_name")?,
        target_catalog_name: row.text("target_catalog_name")?,
        target_schema_name: row.text("target_schema_name")?,
        target_table_name: row.text("target_table_name")?,
        source_group_id: required_text(row, "source_node_group_id")?,
        target_group_id: required_text(row, "target_node_group_id")?,
        channel_id: required_text(row, "channel_id")?,
        sync_on_insert: flag(row, "sync_on_insert")?,
        sync_on_update: flag(row, "sync_on_update")?,
        sync_on_delete: flag(row, "sync_on_delete")?,
        sync_on_incoming_batch: flag(row, "sync_on_incoming_batch")?,
        sync_column_level: flag(row, "sync_column_level")?,
        sync_on_insert_condition: non_blank(row, "sync_on_insert_condition")?,
        sync_on_update_condition: non_blank(row, "sync_on_update_condition")?,
        sync_on_delete_condition: non_blank(row, "sync_on_delete_condition")?,
        name_for_insert_trigger: row.text("name_for_insert_trigger")?,
        name_for_update_trigger: row.text("name_for_update_trigger")?,
        name_for_delete_trigger: row.text("name_for_delete_trigger")?,
        excluded_column_names: row.text("excluded_column_names")?,
        tx_id_expression: row.text("tx_id_expression")?,
        router_name: row.text("router_name")?,
        router_expression: non_blank(row, "router_expression")?,
        initial_load_order: row.int("initial_load_order")?.unwrap_or(1),
        initial_load_select: row.text("initial_load_select")?,
        last_modified: timestamp(row, "last_updated_time")?,
        build_epoch: None,
        updated_by: row.text("last_updated_by")?,
        inactive_time: timestamp(row, "inactive_time")?,
    })
}

pub fn decode_history<R: RecordRow + ?Sized>(row: &R) -> Result<TriggerHistory> {
    let reason_code = required_text(row, "last_trigger_build_reason")?;
    let last_trigger_build_reason = reason_code
        .parse::<TriggerRebuildReason>()
        .map_err(|e| StorageError::invalid("last_trigger_build_reason", e))?;
    let create_time = timestamp(row, "create_time")?
        .ok_or_else(|| StorageError::invalid("create_time", "required value is NULL"))?;

    Ok(TriggerHistory {
        trigger_history_id: required_int(row, "trigger_hist_id")?,
        trigger_id: required_int(row, "trigger_id")?,
        source_table_name: required_text(row, "source_table_name")?,
        table_hash: required_int(row, "table_hash")?,
        create_time,
        column_names: required_text(row, "column_names")?,
        pk_column_names: required_text(row, "pk_column_names")?,
        last_trigger_build_reason,
        name_for_insert_trigger: row.text("name_for_insert_trigger")?,
        name_for_update_trigger: row.text("name_for_update_trigger")?,
        name_for_delete_trigger: row.text("name_for_delete_trigger")?,
        source_schema_name: row.text("source_schema_name")?,
        source_catalog_name: row.text("source_catalog_name")?,
        trigger_row_hash: row.int("trigger_row_hash")?.unwrap_or(0),
    })
}

pub fn decode_link<R: RecordRow + ?Sized>(row: &R) -> Result<NodeGroupLink> {
    Ok(NodeGroupLink {
        source_group_id: required_text(row, "source_node_group_id")?,
        target_group_id: required_text(row, "target_node_group_id")?,
        data_event_action: DataEventAction::from_code(&required_text(row, "data_event_action")?),
    })
}

/// Decode a channel row joined with the node's control row.
///
/// Control columns are NULL when the node has no control row.
pub fn decode_node_channel<R: RecordRow + ?Sized>(row: &R, node_id: &str) -> Result<NodeChannel> {
    Ok(NodeChannel {
        channel: Channel {
            channel_id: required_text(row, "channel_id")?,
            processing_order: required_int(row, "processing_order")?,
            max_batch_size: required_int(row, "max_batch_size")?,
            max_batch_to_send: required_int(row, "max_batch_to_send")?,
            enabled: flag(row, "enabled")?,
            batch_algorithm: required_text(row, "batch_algorithm")?,
        },
        node_id: node_id.to_string(),
        suspended: flag(row, "suspend_enabled")?,
        ignored: flag(row, "ignore_enabled")?,
    })
}
