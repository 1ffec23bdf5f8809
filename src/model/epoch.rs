//! Build epoch derived from the running software version.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Comparator value standing in for "last modified" on virtual triggers.
///
/// Derived only from the software version string, so every node running the
/// same build computes the same epoch, and an upgrade changes it for every
/// virtual trigger at once. The trigger-build engine treats a changed epoch
/// like a newer modification time and rebuilds the configuration triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildEpoch(i64);

impl BuildEpoch {
    /// Compute the epoch for a version string.
    pub fn from_version(version: &str) -> Self {
        let digest = Sha256::digest(version.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(i64::from_be_bytes(bytes) & i64::MAX)
    }

    /// The raw epoch value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for BuildEpoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0.to_be_bytes()))
    }
}
