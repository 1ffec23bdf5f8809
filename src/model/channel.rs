//! Channel configuration.

use serde::{Deserialize, Serialize};

/// A named lane with its own batching and ordering policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub channel_id: String,
    pub processing_order: i64,
    pub max_batch_size: i64,
    pub max_batch_to_send: i64,
    pub enabled: bool,
    pub batch_algorithm: String,
}

impl Channel {
    pub fn new(channel_id: &str, processing_order: i64) -> Self {
        Self {
            channel_id: channel_id.to_string(),
            processing_order,
            max_batch_size: 1000,
            max_batch_to_send: 10,
            enabled: true,
            batch_algorithm: "default".to_string(),
        }
    }
}

/// A channel as seen by one node, including that node's suspend/ignore
/// control flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeChannel {
    pub channel: Channel,
    pub node_id: String,
    pub suspended: bool,
    pub ignored: bool,
}

impl NodeChannel {
    pub fn id(&self) -> &str {
        &self.channel.channel_id
    }
}
