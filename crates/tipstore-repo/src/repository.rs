use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tipstore_content::ContentStore;
use tipstore_local::{CacheEntry, CacheStore, IndexEntry, IndexStore};
use tipstore_types::{Cid, Entity, StorageEnvelope, Timestamp};
use tracing::{debug, warn};

use crate::codec::Document;
use crate::config::RepositoryConfig;
use crate::error::{RepoError, RepoResult};

/// Counts reported by [`ContentAddressedRepository::stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStats {
    /// Ids with an index entry.
    pub tracked: usize,
    /// Ids with a cache entry, fresh or not.
    pub cached: usize,
    /// Size of the raw index table.
    pub index_bytes: u64,
}

/// How a lookup was satisfied.
enum Resolution<T> {
    /// Cache entry within its TTL.
    Fresh(T),
    /// Fetched from the content store; the cache has been refreshed.
    Fetched(T),
    /// The fetch failed and an expired cache entry was served instead.
    Stale(T),
    /// No index entry for the id.
    Untracked,
    /// Tracked, but neither the store nor the cache could produce it.
    Unavailable(RepoError),
}

/// Generic content-addressed repository for one entity kind.
///
/// Composes the remote [`ContentStore`] with the local [`IndexStore`] and
/// [`CacheStore`]. Lookups go cache (if fresh), then index, then store, and
/// fall back to an expired cache entry when the store fails.
///
/// Reads never fail: every error degrades to stale data or `None`. Writes
/// return errors so callers know whether a durable write happened.
///
/// Concurrent writes to the same id are last-write-wins at the index; there
/// is no version check before overwriting an index entry.
pub struct ContentAddressedRepository<T: Entity> {
    content: Arc<dyn ContentStore>,
    index: Arc<IndexStore>,
    cache: Arc<CacheStore>,
    config: RepositoryConfig,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> ContentAddressedRepository<T> {
    pub fn new(
        content: Arc<dyn ContentStore>,
        index: Arc<IndexStore>,
        cache: Arc<CacheStore>,
        config: RepositoryConfig,
    ) -> Self {
        Self {
            content,
            index,
            cache,
            config,
            _entity: PhantomData,
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Serialize `entity`, write it, and point the index at the new CID.
    ///
    /// Every call produces a new CID, even for unchanged content. A failure
    /// to refresh the cache is logged and does not fail the write.
    pub async fn store(&self, entity: T) -> RepoResult<Cid> {
        let id = entity.id().to_string();
        let now = Timestamp::now();
        let envelope = StorageEnvelope::new(now).with_nonce(write_nonce());
        let document = Document::new(envelope, entity);
        let bytes = document.encode()?;

        let receipt = self.content.store(&bytes).await?;
        self.index.set(
            T::KIND,
            &id,
            IndexEntry {
                cid: receipt.cid.clone(),
                last_updated: now,
                version: envelope.version_tag(),
            },
        )?;

        if let Err(e) = self
            .cache
            .set(T::KIND, &id, &CacheEntry::new(document.body, now))
        {
            warn!(kind = %T::KIND, %id, error = %e, "cache refresh failed after write");
        }

        debug!(kind = %T::KIND, %id, cid = %receipt.cid.short(), size = receipt.size, "stored");
        Ok(receipt.cid)
    }

    /// Current value of `id`, or `None`. Never fails.
    pub async fn retrieve(&self, id: &str) -> Option<T> {
        Self::settle(id, self.resolve(id, None).await)
    }

    /// Current value of `id` for a write that must start from existing state.
    ///
    /// An index miss is [`RepoError::NotFound`]. A tracked id that cannot be
    /// produced from the store or the cache returns the underlying error.
    pub async fn resolve_existing(&self, id: &str) -> RepoResult<T> {
        match self.resolve(id, None).await {
            Resolution::Fresh(value) | Resolution::Fetched(value) | Resolution::Stale(value) => {
                Ok(value)
            }
            Resolution::Untracked => Err(RepoError::not_found(T::KIND, id)),
            Resolution::Unavailable(e) => Err(e),
        }
    }

    /// Every tracked entity that can be produced, in id order.
    ///
    /// The index table is read once and the ids are then fetched
    /// concurrently. Ids that fail are left out.
    pub async fn retrieve_tracked(&self) -> Vec<T> {
        let table = match self.index.load(T::KIND) {
            Ok(table) => table,
            Err(e) => {
                warn!(kind = %T::KIND, error = %e, "index listing failed");
                return Vec::new();
            }
        };
        join_all(table.into_iter().map(|(id, entry)| async move {
            Self::settle(&id, self.resolve(&id, Some(entry)).await)
        }))
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    /// Every tracked entity that can be produced, newest first (ties by id).
    pub async fn list_all(&self) -> Vec<T> {
        let mut values = self.retrieve_tracked().await;
        values.sort_by(|a, b| {
            b.recency()
                .cmp(&a.recency())
                .then_with(|| a.id().cmp(b.id()))
        });
        values
    }

    /// Merge `patch` into the current value and store the result.
    pub async fn update(&self, id: &str, patch: T::Patch) -> RepoResult<Cid> {
        let mut value = self.resolve_existing(id).await?;
        value.apply(patch);
        self.store(value).await
    }

    /// Forget `id` locally. The blob itself stays in the content store.
    ///
    /// Returns `true` if the id was tracked.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let tracked = self.index.remove(T::KIND, id)?;
        self.cache.remove(T::KIND, id)?;
        debug!(kind = %T::KIND, %id, tracked, "deleted");
        Ok(tracked)
    }

    /// [`Self::list_all`] filtered in memory.
    pub async fn search<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.list_all()
            .await
            .into_iter()
            .filter(|value| predicate(value))
            .collect()
    }

    /// Where the current version of `id` lives.
    pub fn index_entry(&self, id: &str) -> Option<IndexEntry> {
        self.index.get(T::KIND, id).unwrap_or_else(|e| {
            warn!(kind = %T::KIND, %id, error = %e, "index lookup failed");
            None
        })
    }

    /// All tracked ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.index.list_ids(T::KIND).unwrap_or_else(|e| {
            warn!(kind = %T::KIND, error = %e, "index listing failed");
            Vec::new()
        })
    }

    pub fn stats(&self) -> RepoResult<RepositoryStats> {
        Ok(RepositoryStats {
            tracked: self.index.len(T::KIND)?,
            cached: self.cache.len(T::KIND)?,
            index_bytes: self.index.byte_size(T::KIND)?,
        })
    }

    /// Drop every cached value of this kind. Returns the number removed.
    pub fn clear_cache(&self) -> RepoResult<usize> {
        Ok(self.cache.clear(T::KIND)?)
    }

    pub fn public_url(&self, cid: &Cid) -> String {
        self.content.resolve_public_url(cid)
    }

    fn settle(id: &str, resolution: Resolution<T>) -> Option<T> {
        match resolution {
            Resolution::Fresh(value) | Resolution::Fetched(value) | Resolution::Stale(value) => {
                Some(value)
            }
            Resolution::Untracked => None,
            Resolution::Unavailable(e) => {
                warn!(kind = %T::KIND, %id, error = %e, "entity unavailable");
                None
            }
        }
    }

    /// `known` is the index entry when the caller already holds it.
    async fn resolve(&self, id: &str, known: Option<IndexEntry>) -> Resolution<T> {
        let cached = self.cache.get::<T>(T::KIND, id).unwrap_or_else(|e| {
            warn!(kind = %T::KIND, %id, error = %e, "cache read failed");
            None
        });

        if let Some(entry) = &cached {
            if CacheStore::is_valid(entry.last_updated, self.config.ttl) {
                return Resolution::Fresh(entry.value.clone());
            }
        }

        let lookup = match known {
            Some(entry) => Ok(Some(entry)),
            None => self.index.get(T::KIND, id),
        };
        let entry = match lookup {
            Ok(Some(entry)) => entry,
            Ok(None) => return Resolution::Untracked,
            Err(e) => return Self::fall_back(id, cached, e.into()),
        };

        match self.fetch(&entry.cid).await {
            Ok(value) => {
                if let Err(e) = self
                    .cache
                    .set(T::KIND, id, &CacheEntry::fresh(value.clone()))
                {
                    warn!(kind = %T::KIND, %id, error = %e, "cache refresh failed");
                }
                Resolution::Fetched(value)
            }
            Err(e) => Self::fall_back(id, cached, e),
        }
    }

    fn fall_back(id: &str, cached: Option<CacheEntry<T>>, error: RepoError) -> Resolution<T> {
        match cached {
            Some(entry) => {
                warn!(
                    kind = %T::KIND,
                    %id,
                    cached_at = %entry.last_updated,
                    error = %error,
                    "serving stale cache entry"
                );
                Resolution::Stale(entry.value)
            }
            None => Resolution::Unavailable(error),
        }
    }

    async fn fetch(&self, cid: &Cid) -> RepoResult<T> {
        let bytes = self.content.retrieve(cid).await?;
        Ok(Document::<T>::decode(cid, &bytes)?.body)
    }
}

impl<T: Entity> std::fmt::Debug for ContentAddressedRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentAddressedRepository")
            .field("kind", &T::KIND)
            .field("ttl", &self.config.ttl)
            .finish_non_exhaustive()
    }
}

/// Salt mixed into each envelope: wall-clock nanos plus a process counter.
fn write_nonce() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    nanos.wrapping_add(SEQ.fetch_add(1, Ordering::Relaxed))
}
