//! Content-addressed repositories for tipstore.
//!
//! A repository composes the remote content store with the local index and
//! cache for one entity kind. Writes serialize the entity inside a versioned
//! envelope, store it, and point the index at the returned CID. Reads try a
//! fresh cache entry, then the index and the store, then fall back to an
//! expired cache entry.
//!
//! # Key Types
//!
//! - [`ContentAddressedRepository`] -- Generic repository, one per entity kind
//! - [`TipHistoryRepository`] -- Per-event tip lists plus cross-event queries
//! - [`Document`] -- The versioned JSON document written for each entity
//! - [`RepositoryConfig`] -- TTL settings
//! - [`EventTipStats`] -- Aggregates derived from one event's tips

pub mod codec;
pub mod config;
pub mod error;
pub mod repository;
pub mod tips;

pub use codec::Document;
pub use config::{RepositoryConfig, DEFAULT_EVENT_TTL, DEFAULT_SPEAKER_TTL, DEFAULT_TIP_TTL};
pub use error::{RepoError, RepoResult};
pub use repository::{ContentAddressedRepository, RepositoryStats};
pub use tips::{EventTipStats, SpeakerTotal, TipHistoryRepository};
