//! Local durable storage for tipstore.
//!
//! Because a CID changes on every write, the remote store alone cannot answer
//! "what is the current version of entity X". This crate keeps that answer
//! locally, next to a best-effort cache of recently materialized values.
//!
//! # Architecture
//!
//! - **Key/value backends** hold JSON strings under string keys. They are the
//!   only thing that touches disk or memory.
//! - **The index** maps an entity id to its current CID, one table per kind.
//!   It is the single record of which blob is current.
//! - **The cache** keeps the last value read or written per entity, tagged
//!   with the time it was stored, so repeated reads and outages of the remote
//!   store can be absorbed.
//!
//! Index and cache writes are independent; a crash between them can leave
//! the cache one version behind the index until its TTL expires.
//!
//! # Modules
//!
//! - [`error`]: Error types for local storage
//! - [`traits`]: The [`KeyValueStore`] trait
//! - [`memory`]: In-memory [`InMemoryKeyValueStore`] for tests
//! - [`file`]: Directory-backed [`FileKeyValueStore`]
//! - [`index`]: [`IndexStore`] and [`IndexEntry`]
//! - [`cache`]: [`CacheStore`], [`CacheEntry`] and the TTL predicate

pub mod cache;
pub mod error;
pub mod file;
pub mod index;
pub mod keys;
pub mod memory;
pub mod traits;

pub use cache::{is_valid_at, CacheEntry, CacheStore};
pub use error::{LocalError, Result};
pub use file::FileKeyValueStore;
pub use index::{IndexEntry, IndexStore};
pub use memory::InMemoryKeyValueStore;
pub use traits::KeyValueStore;
