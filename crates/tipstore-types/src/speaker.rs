use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::kind::EntityKind;
use crate::temporal::Timestamp;

/// Public profile of a speaker who can receive tips.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Address tips are paid to.
    pub wallet_address: String,
    /// Platform name to handle, e.g. `"twitter" -> "@alice"`.
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
    #[serde(default)]
    pub event_ids: Vec<String>,
    pub created_at: Timestamp,
}

impl SpeakerProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, wallet_address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bio: String::new(),
            avatar_url: None,
            wallet_address: wallet_address.into(),
            social_links: BTreeMap::new(),
            event_ids: Vec::new(),
            created_at: Timestamp::now(),
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    /// Case-insensitive match against name and bio.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.bio.to_lowercase().contains(&query)
    }
}

/// Partial update for a [`SpeakerProfile`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeakerPatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<Option<String>>,
    pub wallet_address: Option<String>,
    pub social_links: Option<BTreeMap<String, String>>,
    pub event_ids: Option<Vec<String>>,
}

impl Entity for SpeakerProfile {
    type Patch = SpeakerPatch;

    const KIND: EntityKind = EntityKind::Speaker;

    fn id(&self) -> &str {
        &self.id
    }

    fn recency(&self) -> Timestamp {
        self.created_at
    }

    fn apply(&mut self, patch: SpeakerPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(bio) = patch.bio {
            self.bio = bio;
        }
        if let Some(avatar) = patch.avatar_url {
            self.avatar_url = avatar;
        }
        if let Some(wallet) = patch.wallet_address {
            self.wallet_address = wallet;
        }
        if let Some(links) = patch.social_links {
            self.social_links = links;
        }
        if let Some(event_ids) = patch.event_ids {
            self.event_ids = event_ids;
        }
    }
}
