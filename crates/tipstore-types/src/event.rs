use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::kind::EntityKind;
use crate::temporal::Timestamp;

/// A conference or meetup that attendees can tip speakers at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Wallet address of the organizer.
    pub organizer: String,
    /// Ids of the speakers presenting at this event.
    #[serde(default)]
    pub speaker_ids: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: Timestamp,
}

fn default_true() -> bool {
    true
}

impl Event {
    /// A new active event with no speakers.
    pub fn new(id: impl Into<String>, name: impl Into<String>, organizer: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            location: String::new(),
            start_time: now,
            end_time: now,
            organizer: organizer.into(),
            speaker_ids: Vec::new(),
            is_active: true,
            created_at: now,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_schedule(mut self, start: Timestamp, end: Timestamp) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    pub fn with_speakers(mut self, speaker_ids: Vec<String>) -> Self {
        self.speaker_ids = speaker_ids;
        self
    }

    /// Returns `true` if the event is active and `now` falls in its schedule.
    pub fn is_live_at(&self, now: Timestamp) -> bool {
        self.is_active && self.start_time <= now && now <= self.end_time
    }

    /// Case-insensitive match against name, description and location.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [&self.name, &self.description, &self.location]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

/// Partial update for an [`Event`]. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub organizer: Option<String>,
    pub speaker_ids: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl EventPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Entity for Event {
    type Patch = EventPatch;

    const KIND: EntityKind = EntityKind::Event;

    fn id(&self) -> &str {
        &self.id
    }

    fn recency(&self) -> Timestamp {
        self.created_at
    }

    fn apply(&mut self, patch: EventPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(start) = patch.start_time {
            self.start_time = start;
        }
        if let Some(end) = patch.end_time {
            self.end_time = end;
        }
        if let Some(organizer) = patch.organizer {
            self.organizer = organizer;
        }
        if let Some(speaker_ids) = patch.speaker_ids {
            self.speaker_ids = speaker_ids;
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
    }
}
