//! ChannelStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::model::{Channel, NodeChannel};

/// Interface for channel configuration.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// Every channel as seen by `node_id`, ordered by processing order then
    /// channel id. Channels without a control row are neither suspended nor
    /// ignored.
    async fn node_channels(&self, node_id: &str) -> Result<Vec<NodeChannel>>;

    /// Update the channel with the same id, inserting it if none exists.
    async fn save_channel(&self, channel: &Channel) -> Result<()>;

    async fn delete_channel(&self, channel_id: &str) -> Result<()>;

    /// Record a node's suspend/ignore flags for a channel.
    async fn save_channel_control(
        &self,
        node_id: &str,
        channel_id: &str,
        suspended: bool,
        ignored: bool,
    ) -> Result<()>;
}
