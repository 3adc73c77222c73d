use serde::{Deserialize, Serialize};
use tipstore_types::{Cid, Entity, EntityKind, StorageEnvelope};

use crate::error::{RepoError, RepoResult};

/// The JSON document written to the content store for one entity version.
///
/// ```json
/// { "kind": "event",
///   "envelope": { "schemaVersion": 1, "writtenAt": 1700000000000, "lastUpdated": 1700000000000 },
///   "body": { "id": "e1", "name": "DevCon", ... } }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document<T> {
    pub kind: EntityKind,
    pub envelope: StorageEnvelope,
    pub body: T,
}

/// Kind and envelope only; read first so the body is never parsed under an
/// unknown schema.
#[derive(Deserialize)]
struct Header {
    kind: EntityKind,
    envelope: StorageEnvelope,
}

impl<T: Entity> Document<T> {
    pub fn new(envelope: StorageEnvelope, body: T) -> Self {
        Self {
            kind: T::KIND,
            envelope,
            body,
        }
    }

    pub fn encode(&self) -> RepoResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| RepoError::Serialization(e.to_string()))
    }

    /// Decode bytes fetched under `cid`, rejecting foreign kinds and unknown
    /// schema versions.
    pub fn decode(cid: &Cid, bytes: &[u8]) -> RepoResult<Self> {
        let parse_err = |e: serde_json::Error| RepoError::Parse {
            cid: cid.clone(),
            reason: e.to_string(),
        };

        let header: Header = serde_json::from_slice(bytes).map_err(parse_err)?;
        if header.kind != T::KIND {
            return Err(RepoError::KindMismatch {
                cid: cid.clone(),
                expected: T::KIND,
                found: header.kind,
            });
        }
        if !header.envelope.is_supported() {
            return Err(RepoError::UnsupportedSchema {
                cid: cid.clone(),
                found: header.envelope.schema_version,
            });
        }
        serde_json::from_slice(bytes).map_err(parse_err)
    }
}
