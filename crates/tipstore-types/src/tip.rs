use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::kind::EntityKind;
use crate::temporal::Timestamp;

/// Settlement state of a tip transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipStatus {
    /// Submitted, not yet confirmed on chain.
    Pending,
    Confirmed,
    Failed,
}

impl fmt::Display for TipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for TipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown tip status: {other}")),
        }
    }
}

/// A single tip from an attendee to a speaker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipRecord {
    pub id: String,
    pub speaker_id: String,
    /// Wallet address of the tipper.
    pub tipper: String,
    /// Amount in the token's smallest unit.
    pub amount: u128,
    pub timestamp: Timestamp,
    pub status: TipStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TipRecord {
    /// A pending tip stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        speaker_id: impl Into<String>,
        tipper: impl Into<String>,
        amount: u128,
    ) -> Self {
        Self {
            id: id.into(),
            speaker_id: speaker_id.into(),
            tipper: tipper.into(),
            amount,
            timestamp: Timestamp::now(),
            status: TipStatus::Pending,
            tx_hash: None,
            message: None,
        }
    }

    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// All tips for one event, stored and rewritten as a single blob.
///
/// Tips are unique by id and kept newest-first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipHistory {
    pub event_id: String,
    #[serde(default)]
    pub tips: Vec<TipRecord>,
    pub last_updated: Timestamp,
}

impl TipHistory {
    pub fn new(event_id: impl Into<String>, tips: Vec<TipRecord>) -> Self {
        Self {
            event_id: event_id.into(),
            tips,
            last_updated: Timestamp::now(),
        }
    }

    /// Drop any tip with the same id, then put `tip` at the front.
    pub fn push_newest(&mut self, tip: TipRecord) {
        self.tips.retain(|t| t.id != tip.id);
        self.tips.insert(0, tip);
        self.last_updated = Timestamp::now();
    }

    pub fn find_mut(&mut self, tip_id: &str) -> Option<&mut TipRecord> {
        self.tips.iter_mut().find(|t| t.id == tip_id)
    }
}

impl Entity for TipHistory {
    /// Tip histories are only ever replaced wholesale.
    type Patch = Vec<TipRecord>;

    const KIND: EntityKind = EntityKind::Tip;

    fn id(&self) -> &str {
        &self.event_id
    }

    fn recency(&self) -> Timestamp {
        self.last_updated
    }

    fn apply(&mut self, tips: Vec<TipRecord>) {
        self.tips = tips;
        self.last_updated = Timestamp::now();
    }
}
