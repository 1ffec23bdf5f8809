//! NodeGroupLinkStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::model::{DataEventAction, NodeGroupLink};

/// Read access to the node group topology.
///
/// Links come back ordered by (source, target) so traversal order is
/// reproducible.
#[async_trait]
pub trait NodeGroupLinkStore: Send + Sync {
    async fn group_links(&self) -> Result<Vec<NodeGroupLink>>;

    /// Outgoing links of one group.
    async fn group_links_for(&self, source_group_id: &str) -> Result<Vec<NodeGroupLink>>;

    /// Action on the link between two groups, if linked.
    async fn data_event_action(
        &self,
        source_group_id: &str,
        target_group_id: &str,
    ) -> Result<Option<DataEventAction>>;

    /// Create or replace the link between two groups.
    async fn save_group_link(&self, link: &NodeGroupLink) -> Result<()>;
}
