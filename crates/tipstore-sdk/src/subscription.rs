//! Tip history subscriptions.
//!
//! [`TipFeed`] is the seam a push transport would plug into; the only
//! implementation today is [`PollingTipFeed`], which re-reads the history on a
//! fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tipstore_repo::TipHistoryRepository;
use tipstore_types::TipRecord;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Receives the full, newest-first tip list on every update.
pub type TipCallback = Arc<dyn Fn(Vec<TipRecord>) + Send + Sync>;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Source of tip history updates for one event.
pub trait TipFeed: Send + Sync {
    /// Start delivering updates for `event_id` to `callback`.
    ///
    /// Must be called from within a Tokio runtime.
    fn subscribe(&self, event_id: &str, callback: TipCallback) -> Subscription;
}

/// Handle to a running subscription.
///
/// Dropping the handle cancels the subscription.
#[derive(Debug)]
pub struct Subscription {
    cancel: watch::Sender<bool>,
}

impl Subscription {
    /// A handle and the signal its worker should watch.
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (cancel, rx) = watch::channel(false);
        (Self { cancel }, rx)
    }

    /// Stop all future deliveries. Idempotent.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Polls [`TipHistoryRepository::retrieve_history`] every `interval`.
///
/// The first poll happens one interval after subscribing.
#[derive(Clone)]
pub struct PollingTipFeed {
    tips: Arc<TipHistoryRepository>,
    interval: Duration,
}

impl PollingTipFeed {
    pub fn new(tips: Arc<TipHistoryRepository>, interval: Duration) -> Self {
        Self {
            tips,
            interval: interval.max(MIN_POLL_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl TipFeed for PollingTipFeed {
    fn subscribe(&self, event_id: &str, callback: TipCallback) -> Subscription {
        let (handle, mut cancelled) = Subscription::new();
        let tips = self.tips.clone();
        let period = self.interval;
        let event_id = event_id.to_string();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!(%event_id, ?period, "tip subscription started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let history = tips.retrieve_history(&event_id).await;
                        // A cancel that lands during the fetch wins.
                        if *cancelled.borrow() {
                            break;
                        }
                        callback(history);
                    }
                    changed = cancelled.changed() => {
                        if changed.is_err() || *cancelled.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!(%event_id, "tip subscription stopped");
        });

        handle
    }
}

impl std::fmt::Debug for PollingTipFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingTipFeed")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tipstore_content::InMemoryContentStore;
    use tipstore_local::{CacheStore, InMemoryKeyValueStore, IndexStore};
    use tipstore_repo::RepositoryConfig;
    use tipstore_types::EntityKind;

    const PERIOD: Duration = Duration::from_secs(5);

    fn repo() -> Arc<TipHistoryRepository> {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        Arc::new(TipHistoryRepository::new(
            Arc::new(InMemoryContentStore::new()),
            Arc::new(IndexStore::new(kv.clone())),
            Arc::new(CacheStore::new(kv)),
            RepositoryConfig::for_kind(EntityKind::Tip),
        ))
    }

    fn recorder() -> (Arc<Mutex<Vec<usize>>>, TipCallback) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: TipCallback = Arc::new(move |tips: Vec<TipRecord>| {
            sink.lock().unwrap().push(tips.len());
        });
        (seen, callback)
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_cancelled() {
        let tips = repo();
        let feed = PollingTipFeed::new(tips.clone(), PERIOD);
        let (seen, callback) = recorder();
        let sub = feed.subscribe("e1", callback);

        tokio::time::sleep(PERIOD / 2).await;
        assert!(seen.lock().unwrap().is_empty(), "no poll before the first interval");

        tokio::time::sleep(PERIOD).await;
        tips.add_tip("e1", TipRecord::new("t1", "s1", "0xa", 5))
            .await
            .unwrap();
        tokio::time::sleep(PERIOD).await;
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);

        sub.cancel();
        assert!(sub.is_cancelled());
        tokio::time::sleep(PERIOD * 4).await;
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels() {
        let feed = PollingTipFeed::new(repo(), PERIOD);
        let (seen, callback) = recorder();
        let sub = feed.subscribe("e1", callback);

        tokio::time::sleep(PERIOD + PERIOD / 2).await;
        assert_eq!(seen.lock().unwrap().len(), 1);

        drop(sub);
        tokio::time::sleep(PERIOD * 3).await;
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn subscriptions_are_independent() {
        let feed = PollingTipFeed::new(repo(), PERIOD);
        let (seen_a, callback_a) = recorder();
        let (seen_b, callback_b) = recorder();
        let a = feed.subscribe("e1", callback_a);
        let _b = feed.subscribe("e2", callback_b);

        a.cancel();
        tokio::time::sleep(PERIOD * 2 + PERIOD / 2).await;
        assert!(seen_a.lock().unwrap().is_empty());
        assert_eq!(seen_b.lock().unwrap().len(), 2);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let feed = PollingTipFeed::new(repo(), Duration::ZERO);
        assert_eq!(feed.interval(), MIN_POLL_INTERVAL);
    }
}
