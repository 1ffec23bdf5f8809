//! TriggerHistoryStore trait definition.

use std::collections::HashMap;

use async_trait::async_trait;

use super::Result;
use crate::model::TriggerHistory;

/// Interface for trigger history snapshots.
///
/// History rows are append-only: there is no update or delete.
#[async_trait]
pub trait TriggerHistoryStore: Send + Sync {
    async fn history_by_id(&self, trigger_history_id: i64) -> Result<Option<TriggerHistory>>;

    /// The snapshot with the highest id for a trigger.
    async fn latest_for_trigger(&self, trigger_id: i64) -> Result<Option<TriggerHistory>>;

    /// The snapshot with the highest id for a source table name.
    async fn latest_for_source_table(&self, source_table_name: &str)
        -> Result<Option<TriggerHistory>>;

    async fn all_history(&self) -> Result<HashMap<i64, TriggerHistory>>;

    /// Append a snapshot, returning its newly assigned id.
    ///
    /// `trigger_history_id` on the argument is ignored.
    async fn insert_history(&self, history: &TriggerHistory) -> Result<i64>;
}
