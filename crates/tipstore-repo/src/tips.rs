use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tipstore_content::ContentStore;
use tipstore_local::{CacheStore, IndexEntry, IndexStore};
use tipstore_types::{Cid, EntityKind, Timestamp, TipHistory, TipRecord, TipStatus};
use tracing::debug;

use crate::config::RepositoryConfig;
use crate::error::{RepoError, RepoResult};
use crate::repository::{ContentAddressedRepository, RepositoryStats};

/// Amount received by one speaker within an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerTotal {
    pub speaker_id: String,
    pub amount: u128,
    pub tips: usize,
}

/// Aggregates derived from one event's tip history.
///
/// Failed tips are counted but contribute nothing to amounts or rankings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTipStats {
    pub event_id: String,
    pub total_tips: usize,
    pub total_amount: u128,
    pub confirmed: usize,
    pub pending: usize,
    pub failed: usize,
    pub unique_tippers: usize,
    /// Highest amount first; ties by speaker id.
    pub top_speakers: Vec<SpeakerTotal>,
}

impl EventTipStats {
    pub fn from_tips(event_id: impl Into<String>, tips: &[TipRecord]) -> Self {
        let mut stats = Self {
            event_id: event_id.into(),
            total_tips: tips.len(),
            ..Self::default()
        };
        let mut tippers = HashSet::new();
        let mut per_speaker: BTreeMap<&str, (u128, usize)> = BTreeMap::new();

        for tip in tips {
            tippers.insert(tip.tipper.as_str());
            match tip.status {
                TipStatus::Confirmed => stats.confirmed += 1,
                TipStatus::Pending => stats.pending += 1,
                TipStatus::Failed => {
                    stats.failed += 1;
                    continue;
                }
            }
            stats.total_amount = stats.total_amount.saturating_add(tip.amount);
            let slot = per_speaker.entry(tip.speaker_id.as_str()).or_default();
            slot.0 = slot.0.saturating_add(tip.amount);
            slot.1 += 1;
        }

        stats.unique_tippers = tippers.len();
        stats.top_speakers = per_speaker
            .into_iter()
            .map(|(speaker_id, (amount, tips))| SpeakerTotal {
                speaker_id: speaker_id.to_string(),
                amount,
                tips,
            })
            .collect();
        // Stable sort keeps the BTreeMap's id order for equal amounts.
        stats.top_speakers.sort_by(|a, b| b.amount.cmp(&a.amount));
        stats
    }
}

/// Tip histories, one blob per event.
///
/// Every mutation rewrites the event's whole list. Cross-event queries visit
/// every tracked event; there is no secondary index by speaker.
pub struct TipHistoryRepository {
    histories: ContentAddressedRepository<TipHistory>,
}

impl TipHistoryRepository {
    pub fn new(
        content: Arc<dyn ContentStore>,
        index: Arc<IndexStore>,
        cache: Arc<CacheStore>,
        config: RepositoryConfig,
    ) -> Self {
        Self {
            histories: ContentAddressedRepository::new(content, index, cache, config),
        }
    }

    /// Tips for `event_id`, newest first. Empty when unknown or unreachable.
    pub async fn retrieve_history(&self, event_id: &str) -> Vec<TipRecord> {
        self.histories
            .retrieve(event_id)
            .await
            .map(|history| history.tips)
            .unwrap_or_default()
    }

    /// Add `tip` to the front of the event's history, replacing any tip with
    /// the same id.
    ///
    /// Starts a new history for an untracked event. Fails if the event is
    /// tracked but its current history cannot be read.
    pub async fn add_tip(&self, event_id: &str, tip: TipRecord) -> RepoResult<Cid> {
        let mut history = match self.histories.resolve_existing(event_id).await {
            Ok(history) => history,
            Err(RepoError::NotFound { .. }) => TipHistory::new(event_id, Vec::new()),
            Err(e) => return Err(e),
        };
        debug!(event_id, tip_id = %tip.id, amount = %tip.amount, "adding tip");
        history.push_newest(tip);
        self.histories.store(history).await
    }

    /// Set the status (and optionally the transaction hash) of one tip.
    pub async fn update_tip_status(
        &self,
        event_id: &str,
        tip_id: &str,
        status: TipStatus,
        tx_hash: Option<String>,
    ) -> RepoResult<Cid> {
        let mut history = self.histories.resolve_existing(event_id).await?;
        let tip = history
            .find_mut(tip_id)
            .ok_or_else(|| RepoError::not_found(EntityKind::Tip, tip_id))?;
        tip.status = status;
        if tx_hash.is_some() {
            tip.tx_hash = tx_hash;
        }
        history.last_updated = Timestamp::now();
        self.histories.store(history).await
    }

    /// Every tip across all events, newest first.
    pub async fn all_tips(&self) -> Vec<TipRecord> {
        let mut tips: Vec<TipRecord> = self
            .histories
            .retrieve_tracked()
            .await
            .into_iter()
            .flat_map(|history| history.tips)
            .collect();
        sort_newest_first(&mut tips);
        tips
    }

    pub async fn tips_for_speaker(&self, speaker_id: &str) -> Vec<TipRecord> {
        let mut tips = self.all_tips().await;
        tips.retain(|tip| tip.speaker_id == speaker_id);
        tips
    }

    /// The `limit` most recent tips across all events.
    pub async fn recent_tips(&self, limit: usize) -> Vec<TipRecord> {
        let mut tips = self.all_tips().await;
        tips.truncate(limit);
        tips
    }

    pub async fn event_stats(&self, event_id: &str) -> EventTipStats {
        EventTipStats::from_tips(event_id, &self.retrieve_history(event_id).await)
    }

    /// Events that have a tip history.
    pub fn event_ids(&self) -> Vec<String> {
        self.histories.ids()
    }

    pub fn index_entry(&self, event_id: &str) -> Option<IndexEntry> {
        self.histories.index_entry(event_id)
    }

    pub async fn delete_history(&self, event_id: &str) -> RepoResult<bool> {
        self.histories.delete(event_id).await
    }

    pub fn stats(&self) -> RepoResult<RepositoryStats> {
        self.histories.stats()
    }

    pub fn clear_cache(&self) -> RepoResult<usize> {
        self.histories.clear_cache()
    }
}

impl std::fmt::Debug for TipHistoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TipHistoryRepository")
            .field("histories", &self.histories)
            .finish()
    }
}

fn sort_newest_first(tips: &mut [TipRecord]) {
    tips.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
}
