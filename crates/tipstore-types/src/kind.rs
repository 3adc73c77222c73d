use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kind of entity a repository manages.
///
/// Each kind owns its own index table and cache namespace in local storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Conference or meetup events.
    Event,
    /// Speaker profiles.
    Speaker,
    /// Per-event tip histories.
    Tip,
}

impl EntityKind {
    /// All kinds, in a stable order.
    pub const ALL: [EntityKind; 3] = [EntityKind::Event, EntityKind::Speaker, EntityKind::Tip];

    /// Key prefix used for this kind in local storage.
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Speaker => "speaker",
            Self::Tip => "tip",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" | "events" => Ok(Self::Event),
            "speaker" | "speakers" => Ok(Self::Speaker),
            "tip" | "tips" => Ok(Self::Tip),
            other => Err(TypeError::UnknownKind(other.to_string())),
        }
    }
}
