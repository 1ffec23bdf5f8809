//! Replication configuration records.
//!
//! Plain value types shared by the stores, the caches and the resolver.
//! Nothing here touches storage; decoding from rows lives in
//! [`crate::storage::row`].

mod channel;
mod epoch;
mod history;
mod link;
mod trigger;

pub use channel::{Channel, NodeChannel};
pub use epoch::BuildEpoch;
pub use history::{TriggerHistory, TriggerRebuildReason};
pub use link::{DataEventAction, NodeGroupLink};
pub use trigger::{ChangeMarker, Trigger, TriggerKey};

/// Channel reserved for replicating the replication system's own configuration.
pub const CHANNEL_CONFIG: &str = "config";

/// Un-prefixed name of the node-identity table.
pub const TABLE_NODE: &str = "node";
/// Un-prefixed name of the node security table.
pub const TABLE_NODE_SECURITY: &str = "node_security";
/// Un-prefixed name of the local node identity table.
pub const TABLE_NODE_IDENTITY: &str = "node_identity";

/// Node bookkeeping tables. Changes to these are never captured by
/// configuration triggers.
pub const NODE_TABLES: [&str; 3] = [TABLE_NODE, TABLE_NODE_SECURITY, TABLE_NODE_IDENTITY];

/// Apply the configured table prefix to a configuration table name.
///
/// An empty prefix leaves the name untouched.
pub fn prefixed_table(prefix: &str, table: &str) -> String {
    if prefix.is_empty() {
        table.to_string()
    } else {
        format!("{}_{}", prefix, table)
    }
}
