//! Trigger resolution.
//!
//! The active trigger set of a source group is its persisted triggers
//! followed by the virtual triggers its outgoing links imply:
//!
//! - PUSH: a trigger on the node table so targets always receive node
//!   identity records.
//! - WAIT_FOR_PULL: the configuration triggers for the link, then the whole
//!   resolved set of the target group, since the target cannot forward what
//!   it never pulled.
//!
//! A virtual trigger is dropped when an earlier entry has the same key, so
//! an administrator overrides implicit behaviour by persisting a trigger
//! with matching table, groups and channel.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, info, warn};

use super::history_cache::TriggerHistoryCache;
use super::virtual_triggers::VirtualTriggerBuilder;
use crate::model::{DataEventAction, Trigger, TriggerHistory, CHANNEL_CONFIG};
use crate::storage::{NodeGroupLinkStore, StorageError, TriggerStore};


/// Errors from trigger resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// WAIT_FOR_PULL links lead back to a group already being resolved.
    #[error("Topology cycle through WAIT_FOR_PULL links: {}", .path.join(" -> "))]
    TopologyCycle { path: Vec<String> },
}

pub type Result<T> = std::result::Result<T, ResolveError>;

/// State of one resolution walk.
#[derive(Default)]
struct Walk {
    /// Groups being expanded, root first.
    path: Vec<String>,
    /// Groups whose pulled set has already been emitted.
    expanded: HashSet<String>,
}

pub struct TriggerResolver {
    triggers: Arc<dyn TriggerStore>,
    links: Arc<dyn NodeGroupLinkStore>,
    history: Arc<TriggerHistoryCache>,
    builder: VirtualTriggerBuilder,
}

impl TriggerResolver {
    pub fn new(
        triggers: Arc<dyn TriggerStore>,
        links: Arc<dyn NodeGroupLinkStore>,
        history: Arc<TriggerHistoryCache>,
        builder: VirtualTriggerBuilder,
    ) -> Self {
        Self {
            triggers,
            links,
            history,
            builder,
        }
    }

    pub fn builder(&self) -> &VirtualTriggerBuilder {
        &self.builder
    }

    /// Persisted then virtual triggers for `source_group_id`, without
    /// duplicate keys.
    pub async fn active_triggers_for_source_group(&self, source_group_id: &str) -> Result<Vec<Trigger>> {
        let persisted = self
            .triggers
            .active_triggers_for_source_group(source_group_id)
            .await?;
        let virtual_triggers = self.virtual_triggers(source_group_id).await?;
        Ok(merge(persisted, virtual_triggers))
    }

    /// Triggers implied by the links leaving `source_group_id`, in link
    /// traversal order. May contain duplicate keys.
    pub async fn virtual_triggers(&self, source_group_id: &str) -> Result<Vec<Trigger>> {
        let mut walk = Walk {
            path: vec![source_group_id.to_string()],
            ..Walk::default()
        };
        self.walk(source_group_id, &mut walk).await
    }

    fn walk<'a>(&'a self, group_id: &'a str, walk: &'a mut Walk) -> BoxFuture<'a, Result<Vec<Trigger>>> {
        async move {
            let mut found = Vec::new();
            for link in self.links.group_links_for(group_id).await? {
                let source = link.source_group_id.as_str();
                let target = link.target_group_id.as_str();
                match &link.data_event_action {
                    DataEventAction::Push => {
                        let trigger = self.builder.node_identity_trigger(source, target);
                        info!(
                            source_group_id = source,
                            target_group_id = target,
                            table = %trigger.source_table_name,
                            "Node identity trigger for push link"
                        );
                        found.push(trigger);
                    }
                    DataEventAction::WaitForPull => {
                        if walk.path.iter().any(|visited| visited == target) {
                            let mut cycle = walk.path.clone();
                            cycle.push(target.to_string());
                            return Err(ResolveError::TopologyCycle { path: cycle });
                        }
                        found.extend(self.builder.registration_triggers(source, target));

                        // Another path into a diamond already emitted this
                        // group's set; the merge would drop it again.
                        if walk.expanded.contains(target) {
                            debug!(target_group_id = target, "Pulled group already expanded");
                            continue;
                        }
                        found.extend(self.triggers.active_triggers_for_source_group(target).await?);

                        walk.path.push(target.to_string());
                        let pulled = self.walk(target, walk).await;
                        walk.path.pop();
                        found.extend(pulled?);
                        walk.expanded.insert(target.to_string());
                    }
                    DataEventAction::Other(code) => {
                        warn!(
                            source_group_id = source,
                            target_group_id = target,
                            action = %code,
                            "Unexpected node group link action, skipping"
                        );
                    }
                }
            }
            Ok(found)
        }
        .boxed()
    }

    /// Configuration triggers for one link.
    pub fn registration_triggers(&self, source_group_id: &str, target_group_id: &str) -> Vec<Trigger> {
        self.builder
            .registration_triggers(source_group_id, target_group_id)
    }

    /// The persisted trigger for `table`, else a match in the resolved set.
    pub async fn trigger_for_table(&self, table: &str, source_group_id: &str) -> Result<Option<Trigger>> {
        if let Some(trigger) = self.triggers.trigger_for_table(table, source_group_id).await? {
            return Ok(Some(trigger));
        }
        Ok(self
            .active_triggers_for_source_group(source_group_id)
            .await?
            .into_iter()
            .find(|t| t.source_table_name.eq_ignore_ascii_case(table)))
    }

    pub async fn trigger_for_target(
        &self,
        table: &str,
        source_group_id: &str,
        target_group_id: &str,
        channel_id: &str,
    ) -> Result<Option<Trigger>> {
        Ok(self
            .triggers
            .trigger_for_target(table, source_group_id, target_group_id, channel_id)
            .await?)
    }

    pub async fn trigger_by_id(&self, trigger_id: i64) -> Result<Option<Trigger>> {
        Ok(self.triggers.trigger_by_id(trigger_id).await?)
    }

    pub async fn inactive_triggers_for_source_group(&self, source_group_id: &str) -> Result<Vec<Trigger>> {
        Ok(self
            .triggers
            .inactive_triggers_for_source_group(source_group_id)
            .await?)
    }

    /// Persisted triggers to reload from source to target. The configuration
    /// channel is excluded: it has its own registration load.
    pub async fn active_triggers_for_reload(
        &self,
        source_group_id: &str,
        target_group_id: &str,
    ) -> Result<Vec<Trigger>> {
        Ok(self
            .triggers
            .active_triggers_for_reload(source_group_id, target_group_id, CHANNEL_CONFIG)
            .await?)
    }

    /// Persisted triggers of a group keyed by channel id.
    pub async fn triggers_by_channel(&self, group_id: &str) -> Result<BTreeMap<String, Vec<Trigger>>> {
        let mut by_channel: BTreeMap<String, Vec<Trigger>> = BTreeMap::new();
        for trigger in self.triggers.triggers_for_group(group_id).await? {
            by_channel
                .entry(trigger.channel_id.clone())
                .or_default()
                .push(trigger);
        }
        Ok(by_channel)
    }

    pub async fn save_trigger(&self, trigger: &Trigger) -> Result<()> {
        Ok(self.triggers.save_trigger(trigger).await?)
    }

    /// Most recent history row for a source table.
    pub async fn trigger_history_for_source_table(
        &self,
        source_table_name: &str,
    ) -> Result<Option<Arc<TriggerHistory>>> {
        Ok(self
            .history
            .history_for_source_table(source_table_name)
            .await?)
    }

    pub fn history(&self) -> &Arc<TriggerHistoryCache> {
        &self.history
    }
}

/// `persisted` in order, then each virtual trigger whose key is not yet
/// present.
fn merge(persisted: Vec<Trigger>, virtual_triggers: Vec<Trigger>) -> Vec<Trigger> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(persisted.len() + virtual_triggers.len());
    for trigger in persisted.into_iter().chain(virtual_triggers) {
        if seen.insert(trigger.key()) {
            merged.push(trigger);
        } else {
            debug!(
                table = %trigger.source_table_name,
                source_group_id = %trigger.source_group_id,
                target_group_id = %trigger.target_group_id,
                channel_id = %trigger.channel_id,
                "Suppressed duplicate trigger"
            );
        }
    }
    merged
}
