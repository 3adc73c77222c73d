//! Foundation types for tipstore.
//!
//! Tipstore is the data layer of an event-tipping application. Entities are
//! serialized, written to an immutable content-addressed network, and found
//! again through the content identifier returned at write time. This crate
//! holds the types every other tipstore crate shares.
//!
//! # Key Types
//!
//! - [`Cid`]: Opaque content identifier returned by the remote store
//! - [`Timestamp`]: Wall-clock milliseconds since the UNIX epoch
//! - [`EntityKind`]: Event / speaker / tip; also the local key namespace
//! - [`StorageEnvelope`]: Schema version and timestamps wrapped around a body
//! - [`Entity`]: Trait implemented by every repository-managed value
//! - [`Event`], [`SpeakerProfile`], [`TipHistory`], [`TipRecord`]: Domain data

pub mod cid;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod event;
pub mod kind;
pub mod speaker;
pub mod temporal;
pub mod tip;

pub use cid::Cid;
pub use entity::Entity;
pub use envelope::{StorageEnvelope, CURRENT_SCHEMA_VERSION};
pub use error::TypeError;
pub use event::{Event, EventPatch};
pub use kind::EntityKind;
pub use speaker::{SpeakerPatch, SpeakerProfile};
pub use temporal::Timestamp;
pub use tip::{TipHistory, TipRecord, TipStatus};
