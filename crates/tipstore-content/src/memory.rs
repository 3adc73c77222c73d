use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tipstore_types::Cid;

use crate::error::{ContentError, ContentResult};
use crate::hasher::ContentHasher;
use crate::traits::{Allowance, ContentStore};
use crate::url::PublicUrlResolver;

/// In-memory, HashMap-based content store.
///
/// Intended for tests and embedding. Besides holding blobs it can simulate
/// the failure modes of a remote network: a finite allowance budget, a full
/// outage, per-CID read failures, and fixed per-call latency.
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<Cid, Vec<u8>>>,
    /// Remaining bytes the account can pay for; `None` means unlimited.
    budget: Mutex<Option<u64>>,
    offline: AtomicBool,
    unreadable: RwLock<HashSet<Cid>>,
    latency: Option<Duration>,
    resolver: PublicUrlResolver,
    writes: AtomicU64,
    reads: AtomicU64,
}

impl InMemoryContentStore {
    /// Create a new empty store with an unlimited budget.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            budget: Mutex::new(None),
            offline: AtomicBool::new(false),
            unreadable: RwLock::new(HashSet::new()),
            latency: None,
            resolver: PublicUrlResolver::default(),
            writes: AtomicU64::new(0),
            reads: AtomicU64::new(0),
        }
    }

    /// Limit the total bytes this store will accept.
    pub fn with_budget(self, bytes: u64) -> Self {
        if let Ok(mut budget) = self.budget.lock() {
            *budget = Some(bytes);
        }
        self
    }

    /// Sleep for `latency` inside every read and write.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_resolver(mut self, resolver: PublicUrlResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Simulate a full network outage (or recovery).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make every future read of `cid` fail.
    pub fn fail_retrieval(&self, cid: &Cid) {
        if let Ok(mut set) = self.unreadable.write() {
            set.insert(cid.clone());
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes accepted so far, including repeats of identical bytes.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Read attempts so far, successful or not.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    async fn simulate_network(&self) -> ContentResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(ContentError::Unavailable("network offline".into()));
        }
        Ok(())
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> ContentError {
    ContentError::Unavailable(format!("lock poisoned: {e}"))
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn write_blob(&self, payload: &[u8]) -> ContentResult<Cid> {
        self.simulate_network().await?;

        let size = payload.len() as u64;
        {
            let mut budget = self.budget.lock().map_err(poisoned)?;
            if let Some(remaining) = budget.as_mut() {
                if *remaining < size {
                    return Err(ContentError::InsufficientAllowance {
                        required: size,
                        available: *remaining,
                    });
                }
                *remaining -= size;
            }
        }

        let cid = ContentHasher::BLOB.cid(payload);
        let mut blobs = self.blobs.write().map_err(poisoned)?;
        // Same bytes, same CID: keep the first copy.
        blobs.entry(cid.clone()).or_insert_with(|| payload.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(cid)
    }

    async fn retrieve(&self, cid: &Cid) -> ContentResult<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.simulate_network()
            .await
            .map_err(|e| ContentError::not_retrievable(cid, e.to_string()))?;

        if self.unreadable.read().map_err(poisoned)?.contains(cid) {
            return Err(ContentError::not_retrievable(cid, "retrieval failed"));
        }

        let blobs = self.blobs.read().map_err(poisoned)?;
        let data = blobs
            .get(cid)
            .cloned()
            .ok_or_else(|| ContentError::not_retrievable(cid, "unknown cid"))?;
        if !ContentHasher::BLOB.verify(&data, cid) {
            return Err(ContentError::not_retrievable(cid, "hash mismatch"));
        }
        Ok(data)
    }

    async fn check_allowance(&self, size: u64) -> ContentResult<Allowance> {
        self.simulate_network().await?;
        let budget = *self.budget.lock().map_err(poisoned)?;
        Ok(match budget {
            None => Allowance::UNLIMITED,
            Some(remaining) => Allowance {
                sufficient: remaining >= size,
                available: Some(remaining),
            },
        })
    }

    fn resolve_public_url(&self, cid: &Cid) -> String {
        self.resolver.resolve(cid)
    }

    async fn health(&self) -> ContentResult<()> {
        self.simulate_network().await
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("blob_count", &self.len())
            .field("offline", &self.offline.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MAX_PAYLOAD_SIZE;

    #[tokio::test]
    async fn store_and_retrieve() {
        let store = InMemoryContentStore::new();
        let receipt = store.store(b"hello world").await.unwrap();
        assert_eq!(receipt.size, 11);

        let data = store.retrieve(&receipt.cid).await.unwrap();
        assert_eq!(data, b"hello world");
    }

    #[tokio::test]
    async fn retrieve_is_referentially_transparent() {
        let store = InMemoryContentStore::new();
        let cid = store.store(b"stable").await.unwrap().cid;
        let first = store.retrieve(&cid).await.unwrap();
        let second = store.retrieve(&cid).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn different_content_gets_different_cids() {
        let store = InMemoryContentStore::new();
        let a = store.store(b"aaa").await.unwrap().cid;
        let b = store.store(b"bbb").await.unwrap().cid;
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn identical_writes_are_still_counted() {
        let store = InMemoryContentStore::new();
        store.store(b"same").await.unwrap();
        store.store(b"same").await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn unknown_cid_is_not_retrievable() {
        let store = InMemoryContentStore::new();
        let cid = ContentHasher::BLOB.cid(b"never written");
        let err = store.retrieve(&cid).await.unwrap_err();
        assert!(matches!(err, ContentError::NotRetrievable { .. }));
    }

    #[tokio::test]
    async fn oversize_payload_is_rejected_before_allowance() {
        struct Tiny(InMemoryContentStore);

        #[async_trait]
        impl ContentStore for Tiny {
            async fn write_blob(&self, payload: &[u8]) -> ContentResult<Cid> {
                self.0.write_blob(payload).await
            }
            async fn retrieve(&self, cid: &Cid) -> ContentResult<Vec<u8>> {
                self.0.retrieve(cid).await
            }
            async fn check_allowance(&self, _size: u64) -> ContentResult<Allowance> {
                panic!("allowance must not be checked for oversize payloads");
            }
            fn resolve_public_url(&self, cid: &Cid) -> String {
                self.0.resolve_public_url(cid)
            }
            fn max_payload_size(&self) -> u64 {
                4
            }
        }

        let store = Tiny(InMemoryContentStore::new());
        let err = store.store(b"12345").await.unwrap_err();
        assert!(matches!(err, ContentError::PayloadTooLarge { size: 5, max: 4 }));
        assert!(store.0.is_empty());
    }

    #[test]
    fn ceiling_is_254_mib() {
        assert_eq!(MAX_PAYLOAD_SIZE, 266_338_304);
        assert_eq!(InMemoryContentStore::new().max_payload_size(), MAX_PAYLOAD_SIZE);
    }

    #[tokio::test]
    async fn insufficient_allowance_blocks_write() {
        let store = InMemoryContentStore::new().with_budget(8);
        store.store(b"12345").await.unwrap();

        let err = store.store(b"12345").await.unwrap_err();
        assert!(matches!(
            err,
            ContentError::InsufficientAllowance {
                required: 5,
                available: 3
            }
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn allowance_reports_remaining_budget() {
        let store = InMemoryContentStore::new().with_budget(100);
        let allowance = store.check_allowance(40).await.unwrap();
        assert!(allowance.sufficient);
        assert_eq!(allowance.available, Some(100));
        assert!(!store.check_allowance(101).await.unwrap().sufficient);
    }

    #[tokio::test]
    async fn offline_store_fails_reads_and_writes() {
        let store = InMemoryContentStore::new();
        let cid = store.store(b"before outage").await.unwrap().cid;

        store.set_offline(true);
        assert!(matches!(
            store.retrieve(&cid).await.unwrap_err(),
            ContentError::NotRetrievable { .. }
        ));
        assert!(matches!(
            store.store(b"during outage").await.unwrap_err(),
            ContentError::Unavailable(_)
        ));
        assert!(store.health().await.is_err());

        store.set_offline(false);
        assert_eq!(store.retrieve(&cid).await.unwrap(), b"before outage");
    }

    #[tokio::test]
    async fn fail_retrieval_targets_one_cid() {
        let store = InMemoryContentStore::new();
        let bad = store.store(b"bad").await.unwrap().cid;
        let good = store.store(b"good").await.unwrap().cid;
        store.fail_retrieval(&bad);

        assert!(store.retrieve(&bad).await.is_err());
        assert!(store.retrieve(&good).await.is_ok());
        assert_eq!(store.read_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_simulated() {
        let store = InMemoryContentStore::new().with_latency(Duration::from_millis(250));
        let started = tokio::time::Instant::now();
        store.store(b"slow").await.unwrap();
        // check_allowance + write_blob each sleep once.
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[test]
    fn public_url_uses_resolver() {
        let store = InMemoryContentStore::new()
            .with_resolver(PublicUrlResolver::new("0xabc", "gw.example"));
        let cid = ContentHasher::BLOB.cid(b"x");
        assert_eq!(
            store.resolve_public_url(&cid),
            format!("https://0xabc.gw.example/{cid}")
        );
    }

    #[test]
    fn debug_format() {
        let debug = format!("{:?}", InMemoryContentStore::new());
        assert!(debug.contains("InMemoryContentStore"));
        assert!(debug.contains("blob_count"));
    }
}
