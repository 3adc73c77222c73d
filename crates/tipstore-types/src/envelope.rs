use serde::{Deserialize, Serialize};

use crate::temporal::Timestamp;

/// Schema version written by this build.
///
/// Documents carrying any other version are rejected on decode.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Version and timestamp metadata stored alongside every entity body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageEnvelope {
    pub schema_version: u32,
    /// When this particular blob was written.
    pub written_at: Timestamp,
    /// When the logical entity was last changed.
    pub last_updated: Timestamp,
    /// Per-write salt so rewriting identical content still yields a new CID.
    #[serde(default)]
    pub nonce: u64,
}

impl StorageEnvelope {
    /// Envelope for a write happening at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            written_at: now,
            last_updated: now,
            nonce: 0,
        }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Returns `true` if this build can read documents with this envelope.
    pub fn is_supported(&self) -> bool {
        self.schema_version == CURRENT_SCHEMA_VERSION
    }

    /// The version string recorded in index entries.
    pub fn version_tag(&self) -> String {
        format!("v{}", self.schema_version)
    }
}
