//! Error types for the repository crate.

use tipstore_types::{Cid, EntityKind};

/// Errors that can occur during repository write operations.
///
/// Read operations never return these; they degrade to stale or absent data.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The operation needs an existing entity and the index has none.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// A stored document could not be decoded.
    #[error("corrupt document {cid}: {reason}")]
    Parse { cid: Cid, reason: String },

    /// A stored document was written by an unknown schema version.
    #[error("document {cid} has unsupported schema version {found}")]
    UnsupportedSchema { cid: Cid, found: u32 },

    /// A stored document belongs to a different entity kind.
    #[error("document {cid} is a {found}, expected {expected}")]
    KindMismatch {
        cid: Cid,
        expected: EntityKind,
        found: EntityKind,
    },

    /// An entity could not be serialized for storage.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Remote content store failure.
    #[error("content store error: {0}")]
    Content(#[from] tipstore_content::ContentError),

    /// Local index or cache failure.
    #[error("local storage error: {0}")]
    Local(#[from] tipstore_local::LocalError),
}

impl RepoError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Convenience alias for repository results.
pub type RepoResult<T> = Result<T, RepoError>;
