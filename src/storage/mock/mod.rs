//! Mock storage implementation for testing.
//!
//! `MockConfigStore` keeps everything in memory, counts backend queries so
//! tests can assert caching behaviour, and can be told to fail reads or
//! writes.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    ChannelStore, NodeGroupLinkStore, Result, StorageError, TriggerHistoryStore, TriggerStore,
};
use crate::model::{
    Channel, DataEventAction, NodeChannel, NodeGroupLink, Trigger, TriggerHistory,
};


/// Backend query counters.
#[derive(Default)]
struct Counters {
    trigger_queries: AtomicUsize,
    link_queries: AtomicUsize,
    channel_loads: AtomicUsize,
    history_by_id: AtomicUsize,
    history_latest: AtomicUsize,
}

/// Mock configuration store that stores records in memory.
#[derive(Default)]
pub struct MockConfigStore {
    triggers: RwLock<Vec<Trigger>>,
    history: RwLock<BTreeMap<i64, TriggerHistory>>,
    links: RwLock<Vec<NodeGroupLink>>,
    channels: RwLock<Vec<Channel>>,
    controls: RwLock<HashMap<(String, String), (bool, bool)>>,
    fail_on_read: AtomicBool,
    fail_on_write: AtomicBool,
    load_delay: RwLock<Option<Duration>>,
    counters: Counters,
}

impl MockConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_on_read(&self, fail: bool) {
        self.fail_on_read.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_on_write(&self, fail: bool) {
        self.fail_on_write.store(fail, Ordering::SeqCst);
    }

    /// Make every channel load and history-by-id read take at least `delay`,
    /// failed ones included.
    pub async fn set_load_delay(&self, delay: Duration) {
        *self.load_delay.write().await = Some(delay);
    }

    /// Number of `node_channels` calls, failed ones included.
    pub fn channel_load_count(&self) -> usize {
        self.counters.channel_loads.load(Ordering::SeqCst)
    }

    /// Number of `history_by_id` calls, failed ones included.
    pub fn history_by_id_count(&self) -> usize {
        self.counters.history_by_id.load(Ordering::SeqCst)
    }

    /// Number of `latest_for_trigger` calls served.
    pub fn history_latest_count(&self) -> usize {
        self.counters.history_latest.load(Ordering::SeqCst)
    }

    /// Number of trigger reads served.
    pub fn trigger_query_count(&self) -> usize {
        self.counters.trigger_queries.load(Ordering::SeqCst)
    }

    /// Number of link reads served.
    pub fn link_query_count(&self) -> usize {
        self.counters.link_queries.load(Ordering::SeqCst)
    }

    async fn load_delay(&self) {
        let delay = *self.load_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_on_read.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("mock read failure".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("mock write failure".to_string()));
        }
        Ok(())
    }

    /// Triggers matching `filter`, in initial load order then id.
    async fn select_triggers<F>(&self, filter: F) -> Result<Vec<Trigger>>
    where
        F: Fn(&Trigger) -> bool,
    {
        self.check_read()?;
        self.counters.trigger_queries.fetch_add(1, Ordering::SeqCst);
        let mut selected: Vec<Trigger> = self
            .triggers
            .read()
            .await
            .iter()
            .filter(|t| filter(t))
            .cloned()
            .collect();
        selected.sort_by_key(|t| (t.initial_load_order, t.trigger_id));
        Ok(selected)
    }

    async fn select_links<F>(&self, filter: F) -> Result<Vec<NodeGroupLink>>
    where
        F: Fn(&NodeGroupLink) -> bool,
    {
        self.check_read()?;
        self.counters.link_queries.fetch_add(1, Ordering::SeqCst);
        let mut selected: Vec<NodeGroupLink> = self
            .links
            .read()
            .await
            .iter()
            .filter(|l| filter(l))
            .cloned()
            .collect();
        selected.sort_by(|a, b| {
            (&a.source_group_id, &a.target_group_id).cmp(&(&b.source_group_id, &b.target_group_id))
        });
        Ok(selected)
    }
}

#[async_trait]
impl TriggerStore for MockConfigStore {
    async fn active_triggers_for_source_group(&self, source_group_id: &str) -> Result<Vec<Trigger>> {
        self.select_triggers(|t| t.source_group_id == source_group_id && t.is_active())
            .await
    }

    async fn inactive_triggers_for_source_group(
        &self,
        source_group_id: &str,
    ) -> Result<Vec<Trigger>> {
        self.select_triggers(|t| t.source_group_id == source_group_id && !t.is_active())
            .await
    }

    async fn active_triggers_for_reload(
        &self,
        source_group_id: &str,
        target_group_id: &str,
        excluded_channel_id: &str,
    ) -> Result<Vec<Trigger>> {
        self.select_triggers(|t| {
            t.source_group_id == source_group_id
                && t.target_group_id == target_group_id
                && t.channel_id != excluded_channel_id
                && t.is_active()
        })
        .await
    }

    async fn trigger_for_table(&self, table: &str, source_group_id: &str) -> Result<Option<Trigger>> {
        let found = self
            .select_triggers(|t| {
                t.source_table_name.eq_ignore_ascii_case(table)
                    && t.source_group_id == source_group_id
                    && t.is_active()
            })
            .await?;
        Ok(found.into_iter().next())
    }

    async fn trigger_for_target(
        &self,
        table: &str,
        source_group_id: &str,
        target_group_id: &str,
        channel_id: &str,
    ) -> Result<Option<Trigger>> {
        let found = self
            .select_triggers(|t| {
                t.source_table_name.eq_ignore_ascii_case(table)
                    && t.source_group_id == source_group_id
                    && t.target_group_id == target_group_id
                    && t.channel_id == channel_id
                    && t.is_active()
            })
            .await?;
        Ok(found.into_iter().next())
    }

    async fn trigger_by_id(&self, trigger_id: i64) -> Result<Option<Trigger>> {
        let found = self.select_triggers(|t| t.trigger_id == trigger_id).await?;
        Ok(found.into_iter().next())
    }

    async fn triggers_for_group(&self, group_id: &str) -> Result<Vec<Trigger>> {
        self.select_triggers(|t| t.source_group_id == group_id).await
    }

    async fn save_trigger(&self, trigger: &Trigger) -> Result<()> {
        self.check_write()?;
        let mut stored = trigger.clone();
        stored.last_modified = Some(Utc::now());
        stored.build_epoch = None;
        for field in [
            &mut stored.sync_on_insert_condition,
            &mut stored.sync_on_update_condition,
            &mut stored.sync_on_delete_condition,
            &mut stored.router_expression,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }

        let mut triggers = self.triggers.write().await;
        match triggers.iter_mut().find(|t| t.trigger_id == trigger.trigger_id) {
            Some(existing) => *existing = stored,
            None => triggers.push(stored),
        }
        Ok(())
    }
}

#[async_trait]
impl TriggerHistoryStore for MockConfigStore {
    async fn history_by_id(&self, trigger_history_id: i64) -> Result<Option<TriggerHistory>> {
        self.counters.history_by_id.fetch_add(1, Ordering::SeqCst);
        self.load_delay().await;
        self.check_read()?;
        Ok(self.history.read().await.get(&trigger_history_id).cloned())
    }

    async fn latest_for_trigger(&self, trigger_id: i64) -> Result<Option<TriggerHistory>> {
        self.check_read()?;
        self.counters.history_latest.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .history
            .read()
            .await
            .values()
            .rev()
            .find(|h| h.trigger_id == trigger_id)
            .cloned())
    }

    async fn latest_for_source_table(
        &self,
        source_table_name: &str,
    ) -> Result<Option<TriggerHistory>> {
        self.check_read()?;
        Ok(self
            .history
            .read()
            .await
            .values()
            .rev()
            .find(|h| h.source_table_name == source_table_name)
            .cloned())
    }

    async fn all_history(&self) -> Result<HashMap<i64, TriggerHistory>> {
        self.check_read()?;
        Ok(self
            .history
            .read()
            .await
            .iter()
            .map(|(id, h)| (*id, h.clone()))
            .collect())
    }

    async fn insert_history(&self, history: &TriggerHistory) -> Result<i64> {
        self.check_write()?;
        let mut store = self.history.write().await;
        let id = store.keys().next_back().map_or(1, |last| last + 1);
        let mut stored = history.clone();
        stored.trigger_history_id = id;
        store.insert(id, stored);
        Ok(id)
    }
}

#[async_trait]
impl NodeGroupLinkStore for MockConfigStore {
    async fn group_links(&self) -> Result<Vec<NodeGroupLink>> {
        self.select_links(|_| true).await
    }

    async fn group_links_for(&self, source_group_id: &str) -> Result<Vec<NodeGroupLink>> {
        self.select_links(|l| l.source_group_id == source_group_id)
            .await
    }

    async fn data_event_action(
        &self,
        source_group_id: &str,
        target_group_id: &str,
    ) -> Result<Option<DataEventAction>> {
        let links = self
            .select_links(|l| {
                l.source_group_id == source_group_id && l.target_group_id == target_group_id
            })
            .await?;
        Ok(links.into_iter().next().map(|l| l.data_event_action))
    }

    async fn save_group_link(&self, link: &NodeGroupLink) -> Result<()> {
        self.check_write()?;
        let mut links = self.links.write().await;
        links.retain(|l| {
            !(l.source_group_id == link.source_group_id && l.target_group_id == link.target_group_id)
        });
        links.push(link.clone());
        Ok(())
    }
}

#[async_trait]
impl ChannelStore for MockConfigStore {
    async fn node_channels(&self, node_id: &str) -> Result<Vec<NodeChannel>> {
        self.counters.channel_loads.fetch_add(1, Ordering::SeqCst);
        self.load_delay().await;
        self.check_read()?;

        let controls = self.controls.read().await;
        let mut channels: Vec<NodeChannel> = self
            .channels
            .read()
            .await
            .iter()
            .map(|channel| {
                let (suspended, ignored) = controls
                    .get(&(node_id.to_string(), channel.channel_id.clone()))
                    .copied()
                    .unwrap_or_default();
                NodeChannel {
                    channel: channel.clone(),
                    node_id: node_id.to_string(),
                    suspended,
                    ignored,
                }
            })
            .collect();
        channels.sort_by(|a, b| {
            (a.channel.processing_order, a.id()).cmp(&(b.channel.processing_order, b.id()))
        });
        Ok(channels)
    }

    async fn save_channel(&self, channel: &Channel) -> Result<()> {
        self.check_write()?;
        let mut channels = self.channels.write().await;
        match channels.iter_mut().find(|c| c.channel_id == channel.channel_id) {
            Some(existing) => *existing = channel.clone(),
            None => channels.push(channel.clone()),
        }
        Ok(())
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<()> {
        self.check_write()?;
        self.channels
            .write()
            .await
            .retain(|c| c.channel_id != channel_id);
        self.controls
            .write()
            .await
            .retain(|(_, channel), _| channel != channel_id);
        Ok(())
    }

    async fn save_channel_control(
        &self,
        node_id: &str,
        channel_id: &str,
        suspended: bool,
        ignored: bool,
    ) -> Result<()> {
        self.check_write()?;
        self.controls.write().await.insert(
            (node_id.to_string(), channel_id.to_string()),
            (suspended, ignored),
        );
        Ok(())
    }
}
