//! TriggerStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::model::Trigger;

/// Interface for administrator-defined trigger records.
///
/// "Active" means the trigger has no inactive time. Every list is ordered by
/// initial load order, then trigger id, so callers get a stable sequence.
///
/// # Implementations
///
/// - `SqliteConfigStore`: SQLite storage
/// - `PostgresConfigStore`: PostgreSQL storage
/// - `MockConfigStore`: In-memory mock for testing
#[async_trait]
pub trait TriggerStore: Send + Sync {
    /// Active triggers whose source group is `source_group_id`.
    async fn active_triggers_for_source_group(&self, source_group_id: &str) -> Result<Vec<Trigger>>;

    /// Inactive triggers whose source group is `source_group_id`.
    async fn inactive_triggers_for_source_group(&self, source_group_id: &str)
        -> Result<Vec<Trigger>>;

    /// Active triggers for one link, excluding the given channel.
    ///
    /// Used to pick what an initial load sends; the configuration channel is
    /// loaded separately.
    async fn active_triggers_for_reload(
        &self,
        source_group_id: &str,
        target_group_id: &str,
        excluded_channel_id: &str,
    ) -> Result<Vec<Trigger>>;

    /// First active trigger on `table` for the source group.
    ///
    /// Table names match case-insensitively.
    async fn trigger_for_table(&self, table: &str, source_group_id: &str) -> Result<Option<Trigger>>;

    /// Active trigger on `table` for an exact link and channel.
    async fn trigger_for_target(
        &self,
        table: &str,
        source_group_id: &str,
        target_group_id: &str,
        channel_id: &str,
    ) -> Result<Option<Trigger>>;

    async fn trigger_by_id(&self, trigger_id: i64) -> Result<Option<Trigger>>;

    /// Every trigger, active or not, with `group_id` as source group.
    async fn triggers_for_group(&self, group_id: &str) -> Result<Vec<Trigger>>;

    /// Update the trigger with the same id, inserting it if none exists.
    async fn save_trigger(&self, trigger: &Trigger) -> Result<()>;
}
