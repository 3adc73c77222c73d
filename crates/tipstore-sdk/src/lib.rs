//! Storage orchestrator for tipstore.
//!
//! [`StorageOrchestrator`] is what application code talks to. It is built
//! explicitly from a content store, a key/value store, and a
//! [`StorageConfig`], so tests and embedders can run isolated instances side
//! by side.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod subscription;

pub use config::{ContentConfig, StorageConfig};
pub use error::{SdkError, SdkResult};
pub use orchestrator::{StorageOrchestrator, StorageStats};
pub use subscription::{PollingTipFeed, Subscription, TipCallback, TipFeed};

// Re-export the types callers need to drive the façade.
pub use tipstore_content::{ContentStore, FsContentStore, InMemoryContentStore, PublicUrlResolver};
pub use tipstore_local::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore};
pub use tipstore_repo::{EventTipStats, RepoError, RepositoryStats, SpeakerTotal};
pub use tipstore_types::{
    Cid, EntityKind, Event, EventPatch, SpeakerPatch, SpeakerProfile, Timestamp, TipRecord,
    TipStatus,
};
