use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tipstore_content::ContentStore;
use tipstore_local::{CacheStore, IndexStore, KeyValueStore};
use tipstore_repo::{
    ContentAddressedRepository, EventTipStats, RepoResult, RepositoryStats, TipHistoryRepository,
};
use tipstore_types::{
    Cid, EntityKind, Event, EventPatch, SpeakerPatch, SpeakerProfile, TipRecord, TipStatus,
};
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::error::{SdkError, SdkResult};
use crate::subscription::{PollingTipFeed, Subscription, TipCallback, TipFeed};

/// Per-repository counts plus totals across all three.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub events: RepositoryStats,
    pub speakers: RepositoryStats,
    pub tips: RepositoryStats,
    pub total_tracked: usize,
    pub total_cached: usize,
    pub total_index_bytes: u64,
}

impl StorageStats {
    fn from_parts(events: RepositoryStats, speakers: RepositoryStats, tips: RepositoryStats) -> Self {
        let all = [events, speakers, tips];
        Self {
            events,
            speakers,
            tips,
            total_tracked: all.iter().map(|s| s.tracked).sum(),
            total_cached: all.iter().map(|s| s.cached).sum(),
            total_index_bytes: all.iter().map(|s| s.index_bytes).sum(),
        }
    }
}

/// Outcome of one run of the startup checks, shared by every caller that
/// awaited it.
type StartupCheck = Shared<BoxFuture<'static, Result<(), String>>>;

/// Entry point for application code.
///
/// Owns one repository per entity kind over a shared content store and key
/// value store. Every read method returns empty or `None` when storage is
/// unavailable; every write method returns an error.
///
/// Startup checks run once, on first use. Concurrent callers await the same
/// run and all receive its outcome. After a failure the next call starts a
/// fresh run.
pub struct StorageOrchestrator {
    content: Arc<dyn ContentStore>,
    index: Arc<IndexStore>,
    events: ContentAddressedRepository<Event>,
    speakers: ContentAddressedRepository<SpeakerProfile>,
    tips: Arc<TipHistoryRepository>,
    feed: Arc<dyn TipFeed>,
    ready: AtomicBool,
    pending: Mutex<Option<(u64, StartupCheck)>>,
    attempts: AtomicU64,
}

impl StorageOrchestrator {
    pub fn new(
        content: Arc<dyn ContentStore>,
        kv: Arc<dyn KeyValueStore>,
        config: &StorageConfig,
    ) -> Self {
        let index = Arc::new(IndexStore::new(kv.clone()));
        let cache = Arc::new(CacheStore::new(kv));
        let tips = Arc::new(TipHistoryRepository::new(
            content.clone(),
            index.clone(),
            cache.clone(),
            config.repository_config(EntityKind::Tip),
        ));
        let feed = Arc::new(PollingTipFeed::new(tips.clone(), config.poll_interval()));

        Self {
            events: ContentAddressedRepository::new(
                content.clone(),
                index.clone(),
                cache.clone(),
                config.repository_config(EntityKind::Event),
            ),
            speakers: ContentAddressedRepository::new(
                content.clone(),
                index.clone(),
                cache,
                config.repository_config(EntityKind::Speaker),
            ),
            content,
            index,
            tips,
            feed,
            ready: AtomicBool::new(false),
            pending: Mutex::new(None),
            attempts: AtomicU64::new(0),
        }
    }

    /// Replace the polling feed, e.g. with a push transport.
    pub fn with_feed(mut self, feed: Arc<dyn TipFeed>) -> Self {
        self.feed = feed;
        self
    }

    /// Run the startup checks once.
    ///
    /// Checks that the content store answers and that every index table can
    /// be read. Once this succeeds it is never run again.
    pub async fn initialize(&self) -> SdkResult<()> {
        if self.is_ready() {
            return Ok(());
        }

        let (attempt, check) = {
            let mut pending = self.pending.lock().map_err(|_| {
                SdkError::InitializationFailed("initialization state poisoned".into())
            })?;
            if self.is_ready() {
                return Ok(());
            }
            pending
                .get_or_insert_with(|| {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
                    let check =
                        startup_checks(self.content.clone(), self.index.clone()).boxed().shared();
                    (attempt, check)
                })
                .clone()
        };

        let outcome = check.await;
        if outcome.is_ok() {
            self.ready.store(true, Ordering::SeqCst);
        }
        if let Ok(mut pending) = self.pending.lock() {
            if pending.as_ref().is_some_and(|(current, _)| *current == attempt) {
                *pending = None;
            }
        }
        outcome.map_err(SdkError::InitializationFailed)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn ready_for_read(&self) -> bool {
        match self.initialize().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "storage unavailable, serving empty result");
                false
            }
        }
    }

    /// Counts per repository. A repository whose counts cannot be read
    /// reports zeros.
    pub async fn get_stats(&self) -> StorageStats {
        StorageStats::from_parts(
            stats_or_default(EntityKind::Event, self.events.stats()),
            stats_or_default(EntityKind::Speaker, self.speakers.stats()),
            stats_or_default(EntityKind::Tip, self.tips.stats()),
        )
    }

    // ---- Events ----

    pub async fn get_events(&self) -> Vec<Event> {
        if !self.ready_for_read().await {
            return Vec::new();
        }
        self.events.list_all().await
    }

    pub async fn get_event(&self, id: &str) -> Option<Event> {
        if !self.ready_for_read().await {
            return None;
        }
        self.events.retrieve(id).await
    }

    pub async fn search_events(&self, query: &str) -> Vec<Event> {
        if !self.ready_for_read().await {
            return Vec::new();
        }
        self.events.search(|e| e.matches_query(query)).await
    }

    pub async fn create_event(&self, event: Event) -> SdkResult<Cid> {
        self.initialize().await?;
        Ok(self.events.store(event).await?)
    }

    pub async fn update_event(&self, id: &str, patch: EventPatch) -> SdkResult<Cid> {
        self.initialize().await?;
        Ok(self.events.update(id, patch).await?)
    }

    /// Forget an event locally. Returns `true` if it was tracked.
    pub async fn delete_event(&self, id: &str) -> SdkResult<bool> {
        self.initialize().await?;
        Ok(self.events.delete(id).await?)
    }

    // ---- Speakers ----

    pub async fn get_speaker(&self, id: &str) -> Option<SpeakerProfile> {
        if !self.ready_for_read().await {
            return None;
        }
        self.speakers.retrieve(id).await
    }

    pub async fn get_speakers(&self) -> Vec<SpeakerProfile> {
        if !self.ready_for_read().await {
            return Vec::new();
        }
        self.speakers.list_all().await
    }

    pub async fn search_speakers(&self, query: &str) -> Vec<SpeakerProfile> {
        if !self.ready_for_read().await {
            return Vec::new();
        }
        self.speakers.search(|s| s.matches_query(query)).await
    }

    pub async fn create_speaker(&self, speaker: SpeakerProfile) -> SdkResult<Cid> {
        self.initialize().await?;
        Ok(self.speakers.store(speaker).await?)
    }

    pub async fn update_speaker(&self, id: &str, patch: SpeakerPatch) -> SdkResult<Cid> {
        self.initialize().await?;
        Ok(self.speakers.update(id, patch).await?)
    }

    // ---- Tips ----

    pub async fn add_tip(&self, event_id: &str, tip: TipRecord) -> SdkResult<Cid> {
        self.initialize().await?;
        Ok(self.tips.add_tip(event_id, tip).await?)
    }

    pub async fn update_tip_status(
        &self,
        event_id: &str,
        tip_id: &str,
        status: TipStatus,
        tx_hash: Option<String>,
    ) -> SdkResult<Cid> {
        self.initialize().await?;
        Ok(self
            .tips
            .update_tip_status(event_id, tip_id, status, tx_hash)
            .await?)
    }

    pub async fn get_tip_history(&self, event_id: &str) -> Vec<TipRecord> {
        if !self.ready_for_read().await {
            return Vec::new();
        }
        self.tips.retrieve_history(event_id).await
    }

    pub async fn get_tips_for_speaker(&self, speaker_id: &str) -> Vec<TipRecord> {
        if !self.ready_for_read().await {
            return Vec::new();
        }
        self.tips.tips_for_speaker(speaker_id).await
    }

    pub async fn get_recent_tips(&self, limit: usize) -> Vec<TipRecord> {
        if !self.ready_for_read().await {
            return Vec::new();
        }
        self.tips.recent_tips(limit).await
    }

    pub async fn get_event_stats(&self, event_id: &str) -> EventTipStats {
        if !self.ready_for_read().await {
            return EventTipStats {
                event_id: event_id.to_string(),
                ..EventTipStats::default()
            };
        }
        self.tips.event_stats(event_id).await
    }

    /// Deliver `event_id`'s tip history to `callback` until the returned
    /// handle is cancelled or dropped. Requires a Tokio runtime.
    pub fn subscribe(&self, event_id: &str, callback: TipCallback) -> Subscription {
        self.feed.subscribe(event_id, callback)
    }

    // ---- Misc ----

    pub fn public_url(&self, cid: &Cid) -> String {
        self.content.resolve_public_url(cid)
    }

    /// Drop every cached value of `kind`. Returns the number removed.
    pub fn clear_cache(&self, kind: EntityKind) -> SdkResult<usize> {
        let removed = match kind {
            EntityKind::Event => self.events.clear_cache(),
            EntityKind::Speaker => self.speakers.clear_cache(),
            EntityKind::Tip => self.tips.clear_cache(),
        }?;
        info!(%kind, removed, "cache cleared");
        Ok(removed)
    }
}

impl std::fmt::Debug for StorageOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageOrchestrator")
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

async fn startup_checks(content: Arc<dyn ContentStore>, index: Arc<IndexStore>) -> Result<(), String> {
    info!("initializing storage");
    content
        .health()
        .await
        .map_err(|e| format!("content store: {e}"))?;
    for kind in EntityKind::ALL {
        index.load(kind).map_err(|e| format!("{kind} index: {e}"))?;
    }
    info!("storage ready");
    Ok(())
}

fn stats_or_default(kind: EntityKind, stats: RepoResult<RepositoryStats>) -> RepositoryStats {
    stats.unwrap_or_else(|e| {
        warn!(%kind, error = %e, "stats unavailable");
        RepositoryStats::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;
    use tipstore_content::{Allowance, ContentResult, FsContentStore, InMemoryContentStore};
    use tipstore_local::{FileKeyValueStore, InMemoryKeyValueStore, LocalError};
    use tipstore_repo::RepoError;

    /// Delegates to an in-memory store, counting and slowing health checks.
    struct CountingStore {
        inner: InMemoryContentStore,
        health_checks: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: InMemoryContentStore::new(),
                health_checks: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContentStore for CountingStore {
        async fn write_blob(&self, payload: &[u8]) -> ContentResult<Cid> {
            self.inner.write_blob(payload).await
        }

        async fn retrieve(&self, cid: &Cid) -> ContentResult<Vec<u8>> {
            self.inner.retrieve(cid).await
        }

        async fn check_allowance(&self, size: u64) -> ContentResult<Allowance> {
            self.inner.check_allowance(size).await
        }

        fn resolve_public_url(&self, cid: &Cid) -> String {
            self.inner.resolve_public_url(cid)
        }

        async fn health(&self) -> ContentResult<()> {
            self.health_checks.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.inner.health().await
        }
    }

    /// A key/value store whose every call fails.
    struct BrokenKv;

    impl KeyValueStore for BrokenKv {
        fn get(&self, _key: &str) -> tipstore_local::Result<Option<String>> {
            Err(LocalError::Backend("disk unplugged".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> tipstore_local::Result<()> {
            Err(LocalError::Backend("disk unplugged".into()))
        }
        fn remove(&self, _key: &str) -> tipstore_local::Result<bool> {
            Err(LocalError::Backend("disk unplugged".into()))
        }
        fn keys_with_prefix(&self, _prefix: &str) -> tipstore_local::Result<Vec<String>> {
            Err(LocalError::Backend("disk unplugged".into()))
        }
    }

    /// Hands updates to subscribers only when a test pushes them.
    #[derive(Default)]
    struct PushFeed {
        subscribers: Mutex<Vec<(String, TipCallback, tokio::sync::watch::Receiver<bool>)>>,
    }

    impl PushFeed {
        fn push(&self, event_id: &str, tips: Vec<TipRecord>) {
            for (id, callback, cancelled) in self.subscribers.lock().unwrap().iter() {
                if id == event_id && !*cancelled.borrow() {
                    callback(tips.clone());
                }
            }
        }
    }

    impl TipFeed for PushFeed {
        fn subscribe(&self, event_id: &str, callback: TipCallback) -> Subscription {
            let (handle, cancelled) = Subscription::new();
            self.subscribers
                .lock()
                .unwrap()
                .push((event_id.to_string(), callback, cancelled));
            handle
        }
    }

    fn orchestrator() -> StorageOrchestrator {
        StorageOrchestrator::new(
            Arc::new(InMemoryContentStore::new()),
            Arc::new(InMemoryKeyValueStore::new()),
            &StorageConfig::default(),
        )
    }

    fn counted() -> (Arc<CountingStore>, StorageOrchestrator) {
        let store = Arc::new(CountingStore::new());
        let orch = StorageOrchestrator::new(
            store.clone(),
            Arc::new(InMemoryKeyValueStore::new()),
            &StorageConfig::default(),
        );
        (store, orch)
    }

    #[tokio::test(start_paused = true)]
    async fn initialization_is_single_flight() {
        let (store, orch) = counted();
        assert!(!orch.is_ready());

        let (a, b, c) = tokio::join!(orch.initialize(), orch.initialize(), orch.initialize());
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(store.health_checks.load(Ordering::SeqCst), 1);
        assert!(orch.is_ready());

        orch.initialize().await.unwrap();
        assert_eq!(store.health_checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_a_failed_initialization() {
        let (store, orch) = counted();
        store.inner.set_offline(true);

        let (a, b, c) = tokio::join!(orch.initialize(), orch.initialize(), orch.initialize());
        for result in [a, b, c] {
            assert!(matches!(result, Err(SdkError::InitializationFailed(_))));
        }
        assert_eq!(store.health_checks.load(Ordering::SeqCst), 1);
        assert!(!orch.is_ready());

        store.inner.set_offline(false);
        orch.initialize().await.unwrap();
        assert_eq!(store.health_checks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_initialization_is_retried() {
        let (store, orch) = counted();
        store.inner.set_offline(true);

        let err = orch.initialize().await.unwrap_err();
        assert!(matches!(err, SdkError::InitializationFailed(_)));
        assert!(!orch.is_ready());

        store.inner.set_offline(false);
        orch.initialize().await.unwrap();
        assert!(orch.is_ready());
        assert_eq!(store.health_checks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn reads_degrade_and_writes_fail_before_ready() {
        let (store, orch) = counted();
        store.inner.set_offline(true);

        assert!(orch.get_events().await.is_empty());
        assert!(orch.get_event("e1").await.is_none());
        assert!(orch.get_tip_history("e1").await.is_empty());
        assert_eq!(orch.get_event_stats("e1").await.event_id, "e1");

        let err = orch
            .create_event(Event::new("e1", "DevCon", "0xorg"))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::InitializationFailed(_)));
        let err = orch
            .add_tip("e1", TipRecord::new("t1", "s1", "0xa", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::InitializationFailed(_)));
    }

    #[tokio::test]
    async fn broken_local_storage() {
        let orch = StorageOrchestrator::new(
            Arc::new(InMemoryContentStore::new()),
            Arc::new(BrokenKv),
            &StorageConfig::default(),
        );

        assert!(matches!(
            orch.initialize().await,
            Err(SdkError::InitializationFailed(_))
        ));
        assert!(orch.get_speakers().await.is_empty());
        assert_eq!(orch.get_stats().await, StorageStats::default());
        assert!(matches!(
            orch.clear_cache(EntityKind::Event),
            Err(SdkError::Repo(RepoError::Local(_)))
        ));
    }

    #[tokio::test]
    async fn event_facade() {
        let orch = orchestrator();
        let cid1 = orch
            .create_event(Event::new("e1", "DevCon", "0xorg").with_location("Bogota"))
            .await
            .unwrap();
        orch.create_event(Event::new("e2", "ETHDenver", "0xorg"))
            .await
            .unwrap();

        let cid2 = orch
            .update_event("e1", EventPatch::name("DevCon 2"))
            .await
            .unwrap();
        assert_ne!(cid1, cid2);
        assert_eq!(orch.get_event("e1").await.unwrap().name, "DevCon 2");
        assert_eq!(orch.get_events().await.len(), 2);
        assert_eq!(orch.search_events("bogota").await.len(), 1);

        assert!(orch.delete_event("e2").await.unwrap());
        assert!(orch.get_event("e2").await.is_none());

        let err = orch
            .update_event("e2", EventPatch::name("gone"))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Repo(RepoError::NotFound { .. })));
    }

    #[tokio::test]
    async fn speaker_facade() {
        let orch = orchestrator();
        orch.create_speaker(SpeakerProfile::new("s1", "Alice", "0xa").with_bio("zk proofs"))
            .await
            .unwrap();
        orch.create_speaker(SpeakerProfile::new("s2", "Bob", "0xb"))
            .await
            .unwrap();
        orch.update_speaker(
            "s2",
            SpeakerPatch {
                avatar_url: Some(Some("https://img/bob.png".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(orch.get_speakers().await.len(), 2);
        assert_eq!(
            orch.get_speaker("s2").await.unwrap().avatar_url.as_deref(),
            Some("https://img/bob.png")
        );
        let found = orch.search_speakers("ZK").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "s1");
    }

    #[tokio::test]
    async fn tip_facade_and_stats() {
        let orch = orchestrator();
        orch.add_tip("e1", TipRecord::new("t1", "s1", "0xa", 5))
            .await
            .unwrap();
        orch.add_tip("e1", TipRecord::new("t2", "s2", "0xb", 10))
            .await
            .unwrap();
        orch.update_tip_status("e1", "t1", TipStatus::Confirmed, Some("0xhash".into()))
            .await
            .unwrap();
        orch.create_event(Event::new("e1", "DevCon", "0xorg"))
            .await
            .unwrap();

        let history = orch.get_tip_history("e1").await;
        assert_eq!(history.len(), 2);
        assert_eq!(orch.get_tips_for_speaker("s1").await.len(), 1);
        assert_eq!(orch.get_recent_tips(1).await.len(), 1);

        let event_stats = orch.get_event_stats("e1").await;
        assert_eq!(event_stats.total_amount, 15);
        assert_eq!(event_stats.confirmed, 1);

        let stats = orch.get_stats().await;
        assert_eq!(stats.events.tracked, 1);
        assert_eq!(stats.tips.tracked, 1);
        assert_eq!(stats.speakers, RepositoryStats::default());
        assert_eq!(stats.total_tracked, 2);
        assert_eq!(stats.total_cached, 2);
        assert!(stats.total_index_bytes > 0);
    }

    #[tokio::test]
    async fn clear_cache_is_per_kind() {
        let orch = orchestrator();
        orch.create_event(Event::new("e1", "DevCon", "0xorg"))
            .await
            .unwrap();
        orch.create_speaker(SpeakerProfile::new("s1", "Alice", "0xa"))
            .await
            .unwrap();

        assert_eq!(orch.clear_cache(EntityKind::Event).unwrap(), 1);
        let stats = orch.get_stats().await;
        assert_eq!(stats.events.cached, 0);
        assert_eq!(stats.speakers.cached, 1);
        // Still readable through the index.
        assert!(orch.get_event("e1").await.is_some());
    }

    #[tokio::test]
    async fn public_url_uses_configured_account() {
        let mut config = StorageConfig::default();
        config.content.account = "0xABC".into();
        config.content.gateway_host = "gw.example.net".into();
        let orch = StorageOrchestrator::new(
            Arc::new(InMemoryContentStore::new().with_resolver(config.resolver())),
            Arc::new(InMemoryKeyValueStore::new()),
            &config,
        );
        let cid = Cid::parse("abc123").unwrap();
        assert_eq!(orch.public_url(&cid), "https://0xabc.gw.example.net/abc123");
    }

    #[tokio::test]
    async fn state_survives_restart_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: dir.path().to_path_buf(),
            ..StorageConfig::default()
        };
        let open = || {
            StorageOrchestrator::new(
                Arc::new(FsContentStore::open(config.blob_dir(), config.resolver()).unwrap()),
                Arc::new(FileKeyValueStore::open(config.local_dir()).unwrap()),
                &config,
            )
        };

        {
            let orch = open();
            orch.create_event(Event::new("e1", "DevCon", "0xorg"))
                .await
                .unwrap();
            orch.add_tip("e1", TipRecord::new("t1", "s1", "0xa", 5))
                .await
                .unwrap();
        }

        let orch = open();
        orch.clear_cache(EntityKind::Event).unwrap();
        assert_eq!(orch.get_event("e1").await.unwrap().name, "DevCon");
        assert_eq!(orch.get_tip_history("e1").await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribe_delivers_until_cancelled() {
        let mut config = StorageConfig::default();
        config.poll_interval_secs = 2;
        let orch = StorageOrchestrator::new(
            Arc::new(InMemoryContentStore::new()),
            Arc::new(InMemoryKeyValueStore::new()),
            &config,
        );
        orch.add_tip("e1", TipRecord::new("t1", "s1", "0xa", 5))
            .await
            .unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = orch.subscribe(
            "e1",
            Arc::new(move |tips: Vec<TipRecord>| sink.lock().unwrap().push(tips)),
        );

        tokio::time::sleep(Duration::from_secs(5)).await;
        sub.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0][0].id, "t1");
    }

    #[tokio::test]
    async fn custom_feed_replaces_polling() {
        let feed = Arc::new(PushFeed::default());
        let orch = orchestrator().with_feed(feed.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = orch.subscribe(
            "e1",
            Arc::new(move |tips: Vec<TipRecord>| sink.lock().unwrap().push(tips)),
        );

        feed.push("e1", vec![TipRecord::new("t1", "s1", "0xa", 5)]);
        feed.push("e2", vec![TipRecord::new("t2", "s1", "0xb", 7)]);
        sub.cancel();
        feed.push("e1", Vec::new());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][0].id, "t1");
    }
}
