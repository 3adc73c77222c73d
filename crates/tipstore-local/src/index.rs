use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tipstore_types::{Cid, EntityKind, Timestamp};
use tracing::{debug, warn};

use crate::error::{LocalError, Result};
use crate::keys::index_key;
use crate::traits::KeyValueStore;

/// Where the current version of one entity lives.
///
/// The `cid` always names the most recent known write. Superseded CIDs are
/// forgotten, not chained.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub cid: Cid,
    pub last_updated: Timestamp,
    pub version: String,
}

type IndexMap = BTreeMap<String, IndexEntry>;

/// Durable map from logical entity id to its current [`IndexEntry`].
///
/// One table per [`EntityKind`], each stored as a single JSON object under
/// `<kind>_index`. A table that fails to parse is logged and read as empty.
pub struct IndexStore {
    kv: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write of a table within this process.
    write_lock: Mutex<()>,
}

impl IndexStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    fn decode(key: &str, raw: &str) -> Result<IndexMap> {
        serde_json::from_str(raw).map_err(|e| LocalError::Parse {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// Load the whole table for `kind`.
    pub fn load(&self, kind: EntityKind) -> Result<IndexMap> {
        let key = index_key(kind);
        let Some(raw) = self.kv.get(&key)? else {
            return Ok(IndexMap::new());
        };
        match Self::decode(&key, &raw) {
            Ok(map) => Ok(map),
            Err(LocalError::Parse { key, reason }) => {
                warn!(%key, %reason, "corrupt index table, treating as empty");
                Ok(IndexMap::new())
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, kind: EntityKind, map: &IndexMap) -> Result<()> {
        let raw = serde_json::to_string(map).map_err(|e| LocalError::Serialization(e.to_string()))?;
        self.kv.set(&index_key(kind), &raw)
    }

    fn modify<R>(&self, kind: EntityKind, f: impl FnOnce(&mut IndexMap) -> R) -> Result<R> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| LocalError::Backend(format!("lock poisoned: {e}")))?;
        let mut map = self.load(kind)?;
        let out = f(&mut map);
        self.save(kind, &map)?;
        Ok(out)
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Result<Option<IndexEntry>> {
        Ok(self.load(kind)?.remove(id))
    }

    /// Point `id` at `entry`, replacing whatever was there.
    pub fn set(&self, kind: EntityKind, id: &str, entry: IndexEntry) -> Result<()> {
        debug!(%kind, id, cid = %entry.cid.short(), "index set");
        self.modify(kind, |map| {
            map.insert(id.to_string(), entry);
        })
    }

    /// Drop `id` from the table. Returns `true` if it was present.
    pub fn remove(&self, kind: EntityKind, id: &str) -> Result<bool> {
        self.modify(kind, |map| map.remove(id).is_some())
    }

    /// All tracked ids of `kind`, sorted.
    pub fn list_ids(&self, kind: EntityKind) -> Result<Vec<String>> {
        Ok(self.load(kind)?.into_keys().collect())
    }

    /// Number of tracked ids of `kind`.
    pub fn len(&self, kind: EntityKind) -> Result<usize> {
        Ok(self.load(kind)?.len())
    }

    /// Size in bytes of the raw stored table for `kind`.
    pub fn byte_size(&self, kind: EntityKind) -> Result<u64> {
        Ok(self
            .kv
            .get(&index_key(kind))?
            .map_or(0, |raw| raw.len() as u64))
    }
}

impl std::fmt::Debug for IndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexStore").finish_non_exhaustive()
    }
}
