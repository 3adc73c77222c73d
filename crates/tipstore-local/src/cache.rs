use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tipstore_types::{EntityKind, Timestamp};
use tracing::warn;

use crate::error::{LocalError, Result};
use crate::keys::{cache_key, cache_prefix};
use crate::traits::KeyValueStore;

/// Last successfully materialized value of one entity.
///
/// Advisory only: fresh while `now - last_updated < ttl`, but still served
/// verbatim as a last resort when the remote store cannot be reached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub value: T,
    pub last_updated: Timestamp,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, last_updated: Timestamp) -> Self {
        Self { value, last_updated }
    }

    /// A cache entry stamped with the current time.
    pub fn fresh(value: T) -> Self {
        Self::new(value, Timestamp::now())
    }
}

/// `now - last_updated < ttl`.
pub fn is_valid_at(last_updated: Timestamp, ttl: Duration, now: Timestamp) -> bool {
    now.saturating_elapsed_since(last_updated) < ttl
}

/// Best-effort local copies of entity values, namespaced per kind under
/// `<kind>_cache_<id>`.
pub struct CacheStore {
    kv: Arc<dyn KeyValueStore>,
}

impl CacheStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// [`is_valid_at`] evaluated at the current time.
    pub fn is_valid(last_updated: Timestamp, ttl: Duration) -> bool {
        is_valid_at(last_updated, ttl, Timestamp::now())
    }

    /// Read the cached entry for `id`. Entries that fail to parse are logged
    /// and reported as absent.
    pub fn get<T: DeserializeOwned>(&self, kind: EntityKind, id: &str) -> Result<Option<CacheEntry<T>>> {
        let key = cache_key(kind, id);
        let Some(raw) = self.kv.get(&key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                let err = LocalError::Parse {
                    key,
                    reason: e.to_string(),
                };
                warn!(error = %err, "ignoring corrupt cache entry");
                Ok(None)
            }
        }
    }

    pub fn set<T: Serialize>(&self, kind: EntityKind, id: &str, entry: &CacheEntry<T>) -> Result<()> {
        let raw = serde_json::to_string(entry).map_err(|e| LocalError::Serialization(e.to_string()))?;
        self.kv.set(&cache_key(kind, id), &raw)
    }

    pub fn remove(&self, kind: EntityKind, id: &str) -> Result<bool> {
        self.kv.remove(&cache_key(kind, id))
    }

    /// Remove every cached entry of `kind`, leaving other kinds untouched.
    /// Returns the number of entries removed.
    pub fn clear(&self, kind: EntityKind) -> Result<usize> {
        let keys = self.kv.keys_with_prefix(&cache_prefix(kind))?;
        let mut removed = 0;
        for key in &keys {
            if self.kv.remove(key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Number of cached entries of `kind`.
    pub fn len(&self, kind: EntityKind) -> Result<usize> {
        Ok(self.kv.keys_with_prefix(&cache_prefix(kind))?.len())
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryKeyValueStore;
    use proptest::prelude::*;

    const EVENT_TTL: Duration = Duration::from_secs(5 * 60);
    const SPEAKER_TTL: Duration = Duration::from_secs(10 * 60);
    const TIP_TTL: Duration = Duration::from_secs(2 * 60);

    fn store() -> (Arc<InMemoryKeyValueStore>, CacheStore) {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let cache = CacheStore::new(kv.clone());
        (kv, cache)
    }

    #[test]
    fn set_get_remove() {
        let (_kv, cache) = store();
        let entry = CacheEntry::new("DevCon".to_string(), Timestamp::from_millis(10));
        cache.set(EntityKind::Event, "e1", &entry).unwrap();

        let read: CacheEntry<String> = cache.get(EntityKind::Event, "e1").unwrap().unwrap();
        assert_eq!(read, entry);

        assert!(cache.remove(EntityKind::Event, "e1").unwrap());
        assert!(cache.get::<String>(EntityKind::Event, "e1").unwrap().is_none());
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let (kv, cache) = store();
        kv.set("event_cache_e1", "][").unwrap();
        assert!(cache.get::<String>(EntityKind::Event, "e1").unwrap().is_none());
    }

    #[test]
    fn wrong_shape_is_a_miss() {
        let (_kv, cache) = store();
        cache
            .set(EntityKind::Event, "e1", &CacheEntry::fresh(vec![1, 2, 3]))
            .unwrap();
        assert!(cache.get::<String>(EntityKind::Event, "e1").unwrap().is_none());
    }

    #[test]
    fn clear_only_touches_one_namespace() {
        let (_kv, cache) = store();
        for id in ["a", "b"] {
            cache.set(EntityKind::Event, id, &CacheEntry::fresh(1u32)).unwrap();
            cache.set(EntityKind::Speaker, id, &CacheEntry::fresh(2u32)).unwrap();
            cache.set(EntityKind::Tip, id, &CacheEntry::fresh(3u32)).unwrap();
        }

        assert_eq!(cache.clear(EntityKind::Event).unwrap(), 2);

        assert_eq!(cache.len(EntityKind::Event).unwrap(), 0);
        assert_eq!(cache.len(EntityKind::Speaker).unwrap(), 2);
        assert_eq!(cache.len(EntityKind::Tip).unwrap(), 2);
        assert!(cache.get::<u32>(EntityKind::Speaker, "a").unwrap().is_some());
    }

    #[test]
    fn configured_ttls_boundaries() {
        let now = Timestamp::from_millis(10_000_000);
        for ttl in [EVENT_TTL, SPEAKER_TTL, TIP_TTL] {
            let just_inside = now.saturating_sub(ttl - Duration::from_millis(1));
            let exactly = now.saturating_sub(ttl);
            let past = now.saturating_sub(ttl + Duration::from_millis(1));
            assert!(is_valid_at(just_inside, ttl, now));
            assert!(!is_valid_at(exactly, ttl, now));
            assert!(!is_valid_at(past, ttl, now));
        }
    }

    #[test]
    fn is_valid_uses_wall_clock() {
        let recent = Timestamp::now().saturating_sub(Duration::from_secs(30));
        let old = Timestamp::now().saturating_sub(Duration::from_secs(3 * 60));
        assert!(CacheStore::is_valid(recent, TIP_TTL));
        assert!(!CacheStore::is_valid(old, TIP_TTL));
        assert!(CacheStore::is_valid(old, EVENT_TTL));
    }

    #[test]
    fn zero_ttl_is_never_valid() {
        let now = Timestamp::from_millis(500);
        assert!(!is_valid_at(now, Duration::ZERO, now));
    }

    proptest! {
        #[test]
        fn validity_matches_age_comparison(
            last in 0u64..1_000_000_000,
            age in 0u64..1_000_000,
            ttl_ms in 0u64..1_000_000,
        ) {
            let last_updated = Timestamp::from_millis(last);
            let now = Timestamp::from_millis(last + age);
            let ttl = Duration::from_millis(ttl_ms);
            prop_assert_eq!(is_valid_at(last_updated, ttl, now), age < ttl_ms);
        }
    }
}
