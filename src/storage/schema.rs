//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.
//! Flags are stored as 0/1 integers and timestamps as RFC 3339 text so the
//! same decoders work on every backend.

use sea_query::Iden;

/// Trigger definitions table schema.
#[derive(Iden, Clone, Copy)]
pub enum Triggers {
    Table,
    #[iden = "trigger_id"]
    TriggerId,
    #[iden = "source_catalog_name"]
    SourceCatalogName,
    #[iden = "source_schema_name"]
    SourceSchemaName,
    #[iden = "source_table_name"]
    SourceTableName,
    #[iden = "target_catalog_name"]
    TargetCatalogName,
    #[iden = "target_schema_name"]
    TargetSchemaName,
    #[iden = "target_table_name"]
    TargetTableName,
    #[iden = "source_node_group_id"]
    SourceNodeGroupId,
    #[iden = "target_node_group_id"]
    TargetNodeGroupId,
    #[iden = "channel_id"]
    ChannelId,
    #[iden = "sync_on_insert"]
    SyncOnInsert,
    #[iden = "sync_on_update"]
    SyncOnUpdate,
    #[iden = "sync_on_delete"]
    SyncOnDelete,
    #[iden = "sync_on_incoming_batch"]
    SyncOnIncomingBatch,
    #[iden = "sync_column_level"]
    SyncColumnLevel,
    #[iden = "sync_on_insert_condition"]
    SyncOnInsertCondition,
    #[iden = "sync_on_update_condition"]
    SyncOnUpdateCondition,
    #[iden = "sync_on_delete_condition"]
    SyncOnDeleteCondition,
    #[iden = "name_for_insert_trigger"]
    NameForInsertTrigger,
    #[iden = "name_for_update_trigger"]
    NameForUpdateTrigger,
    #[iden = "name_for_delete_trigger"]
    NameForDeleteTrigger,
    #[iden = "excluded_column_names"]
    ExcludedColumnNames,
    #[iden = "tx_id_expression"]
    TxIdExpression,
    #[iden = "router_name"]
    RouterName,
    #[iden = "router_expression"]
    RouterExpression,
    #[iden = "initial_load_order"]
    InitialLoadOrder,
    #[iden = "initial_load_select"]
    InitialLoadSelect,
    #[iden = "inactive_time"]
    InactiveTime,
    #[iden = "last_updated_by"]
    LastUpdatedBy,
    #[iden = "last_updated_time"]
    LastUpdatedTime,
}

impl Triggers {
    /// Every column, in the order row decoders expect.
    pub const COLUMNS: [Triggers; 30] = [
        Triggers::TriggerId,
        Triggers::SourceCatalogName,
        Triggers::SourceSchemaName,
        Triggers::SourceTableName,
        Triggers::TargetCatalogName,
        Triggers::TargetSchemaName,
        Triggers::TargetTableName,
        Triggers::SourceNodeGroupId,
        Triggers::TargetNodeGroupId,
        Triggers::ChannelId,
        Triggers::SyncOnInsert,
        Triggers::SyncOnUpdate,
        Triggers::SyncOnDelete,
        Triggers::SyncOnIncomingBatch,
        Triggers::SyncColumnLevel,
        Triggers::SyncOnInsertCondition,
        Triggers::SyncOnUpdateCondition,
        Triggers::SyncOnDeleteCondition,
        Triggers::NameForInsertTrigger,
        Triggers::NameForUpdateTrigger,
        Triggers::NameForDeleteTrigger,
        Triggers::ExcludedColumnNames,
        Triggers::TxIdExpression,
        Triggers::RouterName,
        Triggers::RouterExpression,
        Triggers::InitialLoadOrder,
        Triggers::InitialLoadSelect,
        Triggers::InactiveTime,
        Triggers::LastUpdatedBy,
        Triggers::LastUpdatedTime,
    ];
}

/// Trigger history table schema.
#[derive(Iden, Clone, Copy)]
pub enum TriggerHist {
    #[iden = "trigger_history"]
    Table,
    #[iden = "trigger_hist_id"]
    TriggerHistId,
    #[iden = "trigger_id"]
    TriggerId,
    #[iden = "source_table_name"]
    SourceTableName,
    #[iden = "table_hash"]
    TableHash,
    #[iden = "create_time"]
    CreateTime,
    #[iden = "column_names"]
    ColumnNames,
    #[iden = "pk_column_names"]
    PkColumnNames,
    #[iden = "last_trigger_build_reason"]
    LastTriggerBuildReason,
    #[iden = "name_for_insert_trigger"]
    NameForInsertTrigger,
    #[iden = "name_for_update_trigger"]
    NameForUpdateTrigger,
    #[iden = "name_for_delete_trigger"]
    NameForDeleteTrigger,
    #[iden = "source_schema_name"]
    SourceSchemaName,
    #[iden = "source_catalog_name"]
    SourceCatalogName,
    #[iden = "trigger_row_hash"]
    TriggerRowHash,
}

impl TriggerHist {
    pub const COLUMNS: [TriggerHist; 14] = [
        TriggerHist::TriggerHistId,
        TriggerHist::TriggerId,
        TriggerHist::SourceTableName,
        TriggerHist::TableHash,
        TriggerHist::CreateTime,
        TriggerHist::ColumnNames,
        TriggerHist::PkColumnNames,
        TriggerHist::LastTriggerBuildReason,
        TriggerHist::NameForInsertTrigger,
        TriggerHist::NameForUpdateTrigger,
        TriggerHist::NameForDeleteTrigger,
        TriggerHist::SourceSchemaName,
        TriggerHist::SourceCatalogName,
        TriggerHist::TriggerRowHash,
    ];
}

/// Node group links table schema.
#[derive(Iden, Clone, Copy)]
pub enum NodeGroupLinks {
    Table,
    #[iden = "source_node_group_id"]
    SourceNodeGroupId,
    #[iden = "target_node_group_id"]
    TargetNodeGroupId,
    #[iden = "data_event_action"]
    DataEventAction,
}

/// Channels table schema.
#[derive(Iden, Clone, Copy)]
pub enum Channels {
    Table,
    #[iden = "channel_id"]
    ChannelId,
    #[iden = "processing_order"]
    ProcessingOrder,
    #[iden = "max_batch_size"]
    MaxBatchSize,
    #[iden = "max_batch_to_send"]
    MaxBatchToSend,
    #[iden = "enabled"]
    Enabled,
    #[iden = "batch_algorithm"]
    BatchAlgorithm,
}

/// Per-node channel control table schema.
#[derive(Iden, Clone, Copy)]
pub enum NodeChannelCtl {
    Table,
    #[iden = "node_id"]
    NodeId,
    #[iden = "channel_id"]
    ChannelId,
    #[iden = "suspend_enabled"]
    SuspendEnabled,
    #[iden = "ignore_enabled"]
    IgnoreEnabled,
}

/// SQLite DDL, one statement per entry.
pub const SQLITE_SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS triggers (
    trigger_id INTEGER PRIMARY KEY,
    source_catalog_name TEXT,
    source_schema_name TEXT,
    source_table_name TEXT NOT NULL,
    target_catalog_name TEXT,
    target_schema_name TEXT,
    target_table_name TEXT,
    source_node_group_id TEXT NOT NULL,
    target_node_group_id TEXT NOT NULL,
    channel_id TEXT NOT NULL,
    sync_on_insert INTEGER NOT NULL DEFAULT 1,
    sync_on_update INTEGER NOT NULL DEFAULT 1,
    sync_on_delete INTEGER NOT NULL DEFAULT 1,
    sync_on_incoming_batch INTEGER NOT NULL DEFAULT 0,
    sync_column_level INTEGER NOT NULL DEFAULT 0,
    sync_on_insert_condition TEXT,
    sync_on_update_condition TEXT,
    sync_on_delete_condition TEXT,
    name_for_insert_trigger TEXT,
    name_for_update_trigger TEXT,
    name_for_delete_trigger TEXT,
    excluded_column_names TEXT,
    tx_id_expression TEXT,
    router_name TEXT,
    router_expression TEXT,
    initial_load_order INTEGER NOT NULL DEFAULT 1,
    initial_load_select TEXT,
    inactive_time TEXT,
    last_updated_by TEXT,
    last_updated_time TEXT
)"#,
    "CREATE INDEX IF NOT EXISTS idx_triggers_source_group ON triggers(source_node_group_id)",
    r#"
CREATE TABLE IF NOT EXISTS trigger_history (
    trigger_hist_id INTEGER PRIMARY KEY AUTOINCREMENT,
    trigger_id INTEGER NOT NULL,
    source_table_name TEXT NOT NULL,
    table_hash INTEGER NOT NULL,
    create_time TEXT NOT NULL,
    column_names TEXT NOT NULL,
    pk_column_names TEXT NOT NULL,
    last_trigger_build_reason TEXT NOT NULL,
    name_for_insert_trigger TEXT,
    name_for_update_trigger TEXT,
    name_for_delete_trigger TEXT,
    source_schema_name TEXT,
    source_catalog_name TEXT,
    trigger_row_hash INTEGER NOT NULL DEFAULT 0
)"#,
    "CREATE INDEX IF NOT EXISTS idx_trigger_history_trigger ON trigger_history(trigger_id)",
    r#"
CREATE TABLE IF NOT EXISTS node_group_links (
    source_node_group_id TEXT NOT NULL,
    target_node_group_id TEXT NOT NULL,
    data_event_action TEXT NOT NULL,
    PRIMARY KEY (source_node_group_id, target_node_group_id)
)"#,
    r#"
CREATE TABLE IF NOT EXISTS channels (
    channel_id TEXT PRIMARY KEY,
    processing_order INTEGER NOT NULL DEFAULT 1,
    max_batch_size INTEGER NOT NULL DEFAULT 1000,
    max_batch_to_send INTEGER NOT NULL DEFAULT 10,
    enabled INTEGER NOT NULL DEFAULT 1,
    batch_algorithm TEXT NOT NULL DEFAULT 'default'
)"#,
    r#"
CREATE TABLE IF NOT EXISTS node_channel_ctl (
    node_id TEXT NOT NULL,
    channel_id TEXT NOT NULL,
    suspend_enabled INTEGER NOT NULL DEFAULT 0,
    ignore_enabled INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (node_id, channel_id)
)"#,
];

/// PostgreSQL DDL, one statement per entry.
pub const POSTGRES_SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS triggers (
    trigger_id BIGINT PRIMARY KEY,
    source_catalog_name TEXT,
    source_schema_name TEXT,
    source_table_name TEXT NOT NULL,
    target_catalog_name TEXT,
    target_schema_name TEXT,
    target_table_name TEXT,
    source_node_group_id TEXT NOT NULL,
    target_node_group_id TEXT NOT NULL,
    channel_id TEXT NOT NULL,
    sync_on_insert BIGINT NOT NULL DEFAULT 1,
    sync_on_update BIGINT NOT NULL DEFAULT 1,
    sync_on_delete BIGINT NOT NULL DEFAULT 1,
    sync_on_incoming_batch BIGINT NOT NULL DEFAULT 0,
    sync_column_level BIGINT NOT NULL DEFAULT 0,
    sync_on_insert_condition TEXT,
    sync_on_update_condition TEXT,
    sync_on_delete_condition TEXT,
    name_for_insert_trigger TEXT,
    name_for_update_trigger TEXT,
    name_for_delete_trigger TEXT,
    excluded_column_names TEXT,
    tx_id_expression TEXT,
    router_name TEXT,
    router_expression TEXT,
    initial_load_order BIGINT NOT NULL DEFAULT 1,
    initial_load_select TEXT,
    inactive_time TEXT,
    last_updated_by TEXT,
    last_updated_time TEXT
)"#,
    "CREATE INDEX IF NOT EXISTS idx_triggers_source_group ON triggers(source_node_group_id)",
    r#"
CREATE TABLE IF NOT EXISTS trigger_history (
    trigger_hist_id BIGSERIAL PRIMARY KEY,
    trigger_id BIGINT NOT NULL,
    source_table_name TEXT NOT NULL,
    table_hash BIGINT NOT NULL,
    create_time TEXT NOT NULL,
    column_names TEXT NOT NULL,
    pk_column_names TEXT NOT NULL,
    last_trigger_build_reason TEXT NOT NULL,
    name_for_insert_trigger TEXT,
    name_for_update_trigger TEXT,
    name_for_delete_trigger TEXT,
    source_schema_name TEXT,
    source_catalog_name TEXT,
    trigger_row_hash BIGINT NOT NULL DEFAULT 0
)"#,
    "CREATE INDEX IF NOT EXISTS idx_trigger_history_trigger ON trigger_history(trigger_id)",
    r#"
CREATE TABLE IF NOT EXISTS node_group_links (
    source_node_group_id TEXT NOT NULL,
    target_node_group_id TEXT NOT NULL,
    data_event_action TEXT NOT NULL,
    PRIMARY KEY (source_node_group_id, target_node_group_id)
)"#,
    r#"
CREATE TABLE IF NOT EXISTS channels (
    channel_id TEXT PRIMARY KEY,
    processing_order BIGINT NOT NULL DEFAULT 1,
    max_batch_size BIGINT NOT NULL DEFAULT 1000,
    max_batch_to_send BIGINT NOT NULL DEFAULT 10,
    enabled BIGINT NOT NULL DEFAULT 1,
    batch_algorithm TEXT NOT NULL DEFAULT 'default'
)"#,
    r#"
CREATE TABLE IF NOT EXISTS node_channel_ctl (
    node_id TEXT NOT NULL,
    channel_id TEXT NOT NULL,
    suspend_enabled BIGINT NOT NULL DEFAULT 0,
    ignore_enabled BIGINT NOT NULL DEFAULT 0,
    PRIMARY KEY (node_id, channel_id)
)"#,
];
