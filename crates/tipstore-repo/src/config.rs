use std::time::Duration;

use serde::{Deserialize, Serialize};
use tipstore_types::EntityKind;

pub const DEFAULT_EVENT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_SPEAKER_TTL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_TIP_TTL: Duration = Duration::from_secs(2 * 60);

/// Per-repository settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// How long a cached value is served without re-fetching.
    pub ttl: Duration,
}

impl RepositoryConfig {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Default settings for `kind`.
    pub fn for_kind(kind: EntityKind) -> Self {
        let ttl = match kind {
            EntityKind::Event => DEFAULT_EVENT_TTL,
            EntityKind::Speaker => DEFAULT_SPEAKER_TTL,
            EntityKind::Tip => DEFAULT_TIP_TTL,
        };
        Self { ttl }
    }
}
