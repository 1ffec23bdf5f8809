//! Unified SQL configuration store.
//!
//! Statements are built once, backend-agnostically, by the helper functions
//! below. A macro then generates the trait implementations for each SQL
//! backend, since the pool and row types differ per backend.

use std::marker::PhantomData;

use chrono::Utc;
use sea_query::{
    Alias, Expr, Func, OnConflict, Order, Query, SelectStatement, SimpleExpr,
};

use super::SqlDatabase;
use crate::model::{Channel, NodeGroupLink, Trigger, TriggerHistory};
use crate::storage::row::format_timestamp;
use crate::storage::schema::{Channels, NodeChannelCtl, NodeGroupLinks, TriggerHist, Triggers};

/// SQL-based implementation of every configuration store trait.
///
/// This generic implementation works with any SQL database that implements
/// the `SqlDatabase` trait (PostgreSQL, SQLite).
pub struct SqlConfigStore<DB: SqlDatabase> {
    pool: DB::Pool,
    catalog_equals_schema: bool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlConfigStore<DB> {
    /// Create a new SQL configuration store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            catalog_equals_schema: false,
            _marker: PhantomData,
        }
    }

    /// Backfill a missing source catalog from the source schema when
    /// decoding triggers. For databases that do not distinguish the two.
    pub fn with_catalog_equals_schema(mut self, catalog_equals_schema: bool) -> Self {
        self.catalog_equals_schema = catalog_equals_schema;
        self
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &DB::Pool {
        &self.pool
    }
}

fn flag(value: bool) -> SimpleExpr {
    i64::from(value).into()
}

fn select_triggers() -> SelectStatement {
    Query::select()
        .columns(Triggers::COLUMNS)
        .from(Triggers::Table)
        .order_by(Triggers::InitialLoadOrder, Order::Asc)
        .order_by(Triggers::TriggerId, Order::Asc)
        .to_owned()
}

fn table_name_matches(table: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(Triggers::SourceTableName))).eq(table.to_lowercase())
}

/// Values for every trigger column, in `Triggers::COLUMNS` order.
fn trigger_values(trigger: &Trigger, updated_at: &str) -> Vec<SimpleExpr> {
    vec![
        trigger.trigger_id.into(),
        trigger.source_catalog_name.clone().into(),
        trigger.source_schema_name.clone().into(),
        trigger.source_table_name.clone().into(),
        trigger.target_catalog_name.clone().into(),
        trigger.target_schema_name.clone().into(),
        trigger.target_table_name.clone().into(),
        trigger.source_group_id.clone().into(),
        trigger.target_group_id.clone().into(),
        trigger.channel_id.clone().into(),
        flag(trigger.sync_on_insert),
        flag(trigger.sync_on_update),
        flag(trigger.sync_on_delete),
        flag(trigger.sync_on_incoming_batch),
        flag(trigger.sync_column_level),
        trigger.sync_on_insert_condition.clone().into(),
        trigger.sync_on_update_condition.clone().into(),
        trigger.sync_on_delete_condition.clone().into(),
        trigger.name_for_insert_trigger.clone().into(),
        trigger.name_for_update_trigger.clone().into(),
        trigger.name_for_delete_trigger.clone().into(),
        trigger.excluded_column_names.clone().into(),
        trigger.tx_id_expression.clone().into(),
        trigger.router_name.clone().into(),
        trigger.router_expression.clone().into(),
        trigger.initial_load_order.into(),
        trigger.initial_load_select.clone().into(),
        trigger.inactive_time.as_ref().map(format_timestamp).into(),
        trigger.updated_by.clone().into(),
        updated_at.into(),
    ]
}

fn upsert_trigger(trigger: &Trigger) -> sea_query::InsertStatement {
    let updated_at = format_timestamp(&Utc::now());
    let updatable = Triggers::COLUMNS
        .into_iter()
        .filter(|c| !matches!(c, Triggers::TriggerId));

    Query::insert()
        .into_table(Triggers::Table)
        .columns(Triggers::COLUMNS)
        .values_panic(trigger_values(trigger, &updated_at))
        .on_conflict(
            OnConflict::column(Triggers::TriggerId)
                .update_columns(updatable)
                .to_owned(),
        )
        .to_owned()
}

fn select_history() -> SelectStatement {
    Query::select()
        .columns(TriggerHist::COLUMNS)
        .from(TriggerHist::Table)
        .to_owned()
}

fn insert_history(history: &TriggerHistory) -> sea_query::InsertStatement {
    Query::insert()
        .into_table(TriggerHist::Table)
        .columns(TriggerHist::COLUMNS.into_iter().skip(1))
        .values_panic([
            history.trigger_id.into(),
            history.source_table_name.clone().into(),
            history.table_hash.into(),
            format_timestamp(&history.create_time).into(),
            history.column_names.clone().into(),
            history.pk_column_names.clone().into(),
            history.last_trigger_build_reason.code().into(),
            history.name_for_insert_trigger.clone().into(),
            history.name_for_update_trigger.clone().into(),
            history.name_for_delete_trigger.clone().into(),
            history.source_schema_name.clone().into(),
            history.source_catalog_name.clone().into(),
            history.trigger_row_hash.into(),
        ])
        .returning_col(TriggerHist::TriggerHistId)
        .to_owned()
}

fn select_links() -> SelectStatement {
    Query::select()
        .columns([
            NodeGroupLinks::SourceNodeGroupId,
            NodeGroupLinks::TargetNodeGroupId,
            NodeGroupLinks::DataEventAction,
        ])
        .from(NodeGroupLinks::Table)
        .order_by(NodeGroupLinks::SourceNodeGroupId, Order::Asc)
        .order_by(NodeGroupLinks::TargetNodeGroupId, Order::Asc)
        .to_owned()
}

fn upsert_link(link: &NodeGroupLink) -> sea_query::InsertStatement {
    Query::insert()
        .into_table(NodeGroupLinks::Table)
        .columns([
            NodeGroupLinks::SourceNodeGroupId,
            NodeGroupLinks::TargetNodeGroupId,
            NodeGroupLinks::DataEventAction,
        ])
        .values_panic([
            link.source_group_id.clone().into(),
            link.target_group_id.clone().into(),
            link.data_event_action.code().into(),
        ])
        .on_conflict(
            OnConflict::columns([
                NodeGroupLinks::SourceNodeGroupId,
                NodeGroupLinks::TargetNodeGroupId,
            ])
            .update_column(NodeGroupLinks::DataEventAction)
            .to_owned(),
        )
        .to_owned()
}

fn select_node_channels(node_id: &str) -> SelectStatement {
    Query::select()
        .column((Channels::Table, Channels::ChannelId))
        .columns([
            (Channels::Table, Channels::ProcessingOrder),
            (Channels::Table, Channels::MaxBatchSize),
            (Channels::Table, Channels::MaxBatchToSend),
            (Channels::Table, Channels::Enabled),
            (Channels::Table, Channels::BatchAlgorithm),
        ])
        .expr_as(
            Expr::col((NodeChannelCtl::Table, NodeChannelCtl::SuspendEnabled)),
            Alias::new("suspend_enabled"),
        )
        .expr_as(
            Expr::col((NodeChannelCtl::Table, NodeChannelCtl::IgnoreEnabled)),
            Alias::new("ignore_enabled"),
        )
        .from(Channels::Table)
        .left_join(
            NodeChannelCtl::Table,
            Expr::col((Channels::Table, Channels::ChannelId))
                .equals((NodeChannelCtl::Table, NodeChannelCtl::ChannelId))
                .and(Expr::col((NodeChannelCtl::Table, NodeChannelCtl::NodeId)).eq(node_id)),
        )
        .order_by((Channels::Table, Channels::ProcessingOrder), Order::Asc)
        .order_by((Channels::Table, Channels::ChannelId), Order::Asc)
        .to_owned()
}

fn upsert_channel(channel: &Channel) -> sea_query::InsertStatement {
    Query::insert()
        .into_table(Channels::Table)
        .columns([
            Channels::ChannelId,
            Channels::ProcessingOrder,
            Channels::MaxBatchSize,
            Channels::MaxBatchToSend,
            Channels::Enabled,
            Channels::BatchAlgorithm,
        ])
        .values_panic([
            channel.channel_id.clone().into(),
            channel.processing_order.into(),
            channel.max_batch_size.into(),
            channel.max_batch_to_send.into(),
            flag(channel.enabled),
            channel.batch_algorithm.clone().into(),
        ])
        .on_conflict(
            OnConflict::column(Channels::ChannelId)
                .update_columns([
                    Channels::ProcessingOrder,
                    Channels::MaxBatchSize,
                    Channels::MaxBatchToSend,
                    Channels::Enabled,
                    Channels::BatchAlgorithm,
                ])
                .to_owned(),
        )
        .to_owned()
}

fn upsert_channel_control(
    node_id: &str,
    channel_id: &str,
    suspended: bool,
    ignored: bool,
) -> sea_query::InsertStatement {
    Query::insert()
        .into_table(NodeChannelCtl::Table)
        .columns([
            NodeChannelCtl::NodeId,
            NodeChannelCtl::ChannelId,
            NodeChannelCtl::SuspendEnabled,
            NodeChannelCtl::IgnoreEnabled,
        ])
        .values_panic([
            node_id.into(),
            channel_id.into(),
            flag(suspended),
            flag(ignored),
        ])
        .on_conflict(
            OnConflict::columns([NodeChannelCtl::NodeId, NodeChannelCtl::ChannelId])
                .update_columns([NodeChannelCtl::SuspendEnabled, NodeChannelCtl::IgnoreEnabled])
                .to_owned(),
        )
        .to_owned()
}

/// Macro to implement the store traits for a specific SQL backend.
///
/// This eliminates duplication between PostgreSQL and SQLite implementations
/// while maintaining full type safety.
macro_rules! impl_config_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlConfigStore<$db_type> {
            /// Create tables and indexes if they don't exist.
            pub async fn init_schema(&self) -> crate::storage::Result<()> {
                for stmt in <$db_type as SqlDatabase>::SCHEMA {
                    sqlx::query(stmt).execute(&self.pool).await?;
                }
                Ok(())
            }

            async fn fetch_triggers(&self, sql: &str) -> crate::storage::Result<Vec<Trigger>> {
                let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
                rows.iter()
                    .map(|row| crate::storage::row::decode_trigger(row, self.catalog_equals_schema))
                    .collect()
            }

            async fn fetch_trigger(&self, sql: &str) -> crate::storage::Result<Option<Trigger>> {
                let row = sqlx::query(sql).fetch_optional(&self.pool).await?;
                row.as_ref()
                    .map(|row| crate::storage::row::decode_trigger(row, self.catalog_equals_schema))
                    .transpose()
            }

            async fn fetch_history(&self, sql: &str) -> crate::storage::Result<Option<TriggerHistory>> {
                let row = sqlx::query(sql).fetch_optional(&self.pool).await?;
                row.as_ref().map(crate::storage::row::decode_history).transpose()
            }

            async fn fetch_links(&self, sql: &str) -> crate::storage::Result<Vec<NodeGroupLink>> {
                let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
                rows.iter().map(crate::storage::row::decode_link).collect()
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::TriggerStore for SqlConfigStore<$db_type> {
            async fn active_triggers_for_source_group(
                &self,
                source_group_id: &str,
            ) -> crate::storage::Result<Vec<Trigger>> {
                let sql = <$db_type>::build_select(
                    select_triggers()
                        .and_where(Expr::col(Triggers::SourceNodeGroupId).eq(source_group_id))
                        .and_where(Expr::col(Triggers::InactiveTime).is_null())
                        .to_owned(),
                );
                self.fetch_triggers(&sql).await
            }

            async fn inactive_triggers_for_source_group(
                &self,
                source_group_id: &str,
            ) -> crate::storage::Result<Vec<Trigger>> {
                let sql = <$db_type>::build_select(
                    select_triggers()
                        .and_where(Expr::col(Triggers::SourceNodeGroupId).eq(source_group_id))
                        .and_where(Expr::col(Triggers::InactiveTime).is_not_null())
                        .to_owned(),
                );
                self.fetch_triggers(&sql).await
            }

            async fn active_triggers_for_reload(
                &self,
                source_group_id: &str,
                target_group_id: &str,
                excluded_channel_id: &str,
            ) -> crate::storage::Result<Vec<Trigger>> {
                let sql = <$db_type>::build_select(
                    select_triggers()
                        .and_where(Expr::col(Triggers::SourceNodeGroupId).eq(source_group_id))
                        .and_where(Expr::col(Triggers::TargetNodeGroupId).eq(target_group_id))
                        .and_where(Expr::col(Triggers::ChannelId).ne(excluded_channel_id))
                        .and_where(Expr::col(Triggers::InactiveTime).is_null())
                        .to_owned(),
                );
                self.fetch_triggers(&sql).await
            }

            async fn trigger_for_table(
                &self,
                table: &str,
                source_group_id: &str,
            ) -> crate::storage::Result<Option<Trigger>> {
                let sql = <$db_type>::build_select(
                    select_triggers()
                        .and_where(table_name_matches(table))
                        .and_where(Expr::col(Triggers::SourceNodeGroupId).eq(source_group_id))
                        .and_where(Expr::col(Triggers::InactiveTime).is_null())
                        .limit(1)
                        .to_owned(),
                );
                self.fetch_trigger(&sql).await
            }

            async fn trigger_for_target(
                &self,
                table: &str,
                source_group_id: &str,
                target_group_id: &str,
                channel_id: &str,
            ) -> crate::storage::Result<Option<Trigger>> {
                let sql = <$db_type>::build_select(
                    select_triggers()
                        .and_where(table_name_matches(table))
                        .and_where(Expr::col(Triggers::SourceNodeGroupId).eq(source_group_id))
                        .and_where(Expr::col(Triggers::TargetNodeGroupId).eq(target_group_id))
                        .and_where(Expr::col(Triggers::ChannelId).eq(channel_id))
                        .and_where(Expr::col(Triggers::InactiveTime).is_null())
                        .limit(1)
                        .to_owned(),
                );
                self.fetch_trigger(&sql).await
            }

            async fn trigger_by_id(&self, trigger_id: i64) -> crate::storage::Result<Option<Trigger>> {
                let sql = <$db_type>::build_select(
                    select_triggers()
                        .and_where(Expr::col(Triggers::TriggerId).eq(trigger_id))
                        .to_owned(),
                );
                self.fetch_trigger(&sql).await
            }

            async fn triggers_for_group(&self, group_id: &str) -> crate::storage::Result<Vec<Trigger>> {
                let sql = <$db_type>::build_select(
                    select_triggers()
                        .and_where(Expr::col(Triggers::SourceNodeGroupId).eq(group_id))
                        .to_owned(),
                );
                self.fetch_triggers(&sql).await
            }

            async fn save_trigger(&self, trigger: &Trigger) -> crate::storage::Result<()> {
                let sql = <$db_type>::build_insert(upsert_trigger(trigger));
                sqlx::query(&sql).execute(&self.pool).await?;
                Ok(())
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::TriggerHistoryStore for SqlConfigStore<$db_type> {
            async fn history_by_id(
                &self,
                trigger_history_id: i64,
            ) -> crate::storage::Result<Option<TriggerHistory>> {
                let sql = <$db_type>::build_select(
                    select_history()
                        .and_where(Expr::col(TriggerHist::TriggerHistId).eq(trigger_history_id))
                        .to_owned(),
                );
                self.fetch_history(&sql).await
            }

            async fn latest_for_trigger(
                &self,
                trigger_id: i64,
            ) -> crate::storage::Result<Option<TriggerHistory>> {
                let sql = <$db_type>::build_select(
                    select_history()
                        .and_where(Expr::col(TriggerHist::TriggerId).eq(trigger_id))
                        .order_by(TriggerHist::TriggerHistId, Order::Desc)
                        .limit(1)
                        .to_owned(),
                );
                self.fetch_history(&sql).await
            }

            async fn latest_for_source_table(
                &self,
                source_table_name: &str,
            ) -> crate::storage::Result<Option<TriggerHistory>> {
                let sql = <$db_type>::build_select(
                    select_history()
                        .and_where(Expr::col(TriggerHist::SourceTableName).eq(source_table_name))
                        .order_by(TriggerHist::TriggerHistId, Order::Desc)
                        .limit(1)
                        .to_owned(),
                );
                self.fetch_history(&sql).await
            }

            async fn all_history(
                &self,
            ) -> crate::storage::Result<std::collections::HashMap<i64, TriggerHistory>> {
                let sql = <$db_type>::build_select(select_history());
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter()
                    .map(|row| {
                        crate::storage::row::decode_history(row)
                            .map(|history| (history.trigger_history_id, history))
                    })
                    .collect()
            }

            async fn insert_history(&self, history: &TriggerHistory) -> crate::storage::Result<i64> {
                use crate::storage::row::RecordRow;

                let sql = <$db_type>::build_insert(insert_history(history));
                let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
                row.int("trigger_hist_id")?.ok_or_else(|| {
                    crate::storage::StorageError::invalid("trigger_hist_id", "no id returned")
                })
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::NodeGroupLinkStore for SqlConfigStore<$db_type> {
            async fn group_links(&self) -> crate::storage::Result<Vec<NodeGroupLink>> {
                let sql = <$db_type>::build_select(select_links());
                self.fetch_links(&sql).await
            }

            async fn group_links_for(
                &self,
                source_group_id: &str,
            ) -> crate::storage::Result<Vec<NodeGroupLink>> {
                let sql = <$db_type>::build_select(
                    select_links()
                        .and_where(Expr::col(NodeGroupLinks::SourceNodeGroupId).eq(source_group_id))
                        .to_owned(),
                );
                self.fetch_links(&sql).await
            }

            async fn data_event_action(
                &self,
                source_group_id: &str,
                target_group_id: &str,
            ) -> crate::storage::Result<Option<crate::model::DataEventAction>> {
                let sql = <$db_type>::build_select(
                    select_links()
                        .and_where(Expr::col(NodeGroupLinks::SourceNodeGroupId).eq(source_group_id))
                        .and_where(Expr::col(NodeGroupLinks::TargetNodeGroupId).eq(target_group_id))
                        .to_owned(),
                );
                let links = self.fetch_links(&sql).await?;
                Ok(links.into_iter().next().map(|link| link.data_event_action))
            }

            async fn save_group_link(&self, link: &NodeGroupLink) -> crate::storage::Result<()> {
                let sql = <$db_type>::build_insert(upsert_link(link));
                sqlx::query(&sql).execute(&self.pool).await?;
                Ok(())
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::ChannelStore for SqlConfigStore<$db_type> {
            async fn node_channels(
                &self,
                node_id: &str,
            ) -> crate::storage::Result<Vec<crate::model::NodeChannel>> {
                let sql = <$db_type>::build_select(select_node_channels(node_id));
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter()
                    .map(|row| crate::storage::row::decode_node_channel(row, node_id))
                    .collect()
            }

            async fn save_channel(&self, channel: &Channel) -> crate::storage::Result<()> {
                let sql = <$db_type>::build_insert(upsert_channel(channel));
                sqlx::query(&sql).execute(&self.pool).await?;
                Ok(())
            }

            async fn delete_channel(&self, channel_id: &str) -> crate::storage::Result<()> {
                let delete_controls = <$db_type>::build_delete(
                    Query::delete()
                        .from_table(NodeChannelCtl::Table)
                        .and_where(Expr::col(NodeChannelCtl::ChannelId).eq(channel_id))
                        .to_owned(),
                );
                let delete_channel = <$db_type>::build_delete(
                    Query::delete()
                        .from_table(Channels::Table)
                        .and_where(Expr::col(Channels::ChannelId).eq(channel_id))
                        .to_owned(),
                );

                let mut tx = self.pool.begin().await?;
                sqlx::query(&delete_controls).execute(&mut *tx).await?;
                sqlx::query(&delete_channel).execute(&mut *tx).await?;
                tx.commit().await?;
                Ok(())
            }

            async fn save_channel_control(
                &self,
                node_id: &str,
                channel_id: &str,
                suspended: bool,
                ignored: bool,
            ) -> crate::storage::Result<()> {
                let sql = <$db_type>::build_insert(upsert_channel_control(
                    node_id, channel_id, suspended, ignored,
                ));
                sqlx::query(&sql).execute(&self.pool).await?;
                Ok(())
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_config_store!(super::postgres::Postgres, "postgres");
impl_config_store!(super::sqlite::Sqlite, "sqlite");
