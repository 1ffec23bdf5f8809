//! Node group topology edges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How data moves across a node group link.
///
/// Unrecognized codes are kept as [`DataEventAction::Other`] rather than
/// rejected; the resolver logs and skips them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataEventAction {
    /// Source actively sends to target.
    Push,
    /// Target pulls from source.
    WaitForPull,
    Other(String),
}

impl DataEventAction {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "P" => Self::Push,
            "W" => Self::WaitForPull,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Push => "P",
            Self::WaitForPull => "W",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for DataEventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push => f.write_str("PUSH"),
            Self::WaitForPull => f.write_str("WAIT_FOR_PULL"),
            Self::Other(code) => write!(f, "UNKNOWN({})", code),
        }
    }
}

/// A directed edge between two node groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroupLink {
    pub source_group_id: String,
    pub target_group_id: String,
    pub data_event_action: DataEventAction,
}

impl NodeGroupLink {
    pub fn new(source: &str, target: &str, action: DataEventAction) -> Self {
        Self {
            source_group_id: source.to_string(),
            target_group_id: target.to_string(),
            data_event_action: action,
        }
    }
}
