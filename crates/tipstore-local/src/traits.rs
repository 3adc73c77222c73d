//! The [`KeyValueStore`] trait defining the local durable storage interface.
//!
//! Any backend (in-memory, directory of files, embedded database) implements
//! this trait to give the index and cache a string-keyed blob table.

use crate::error::Result;

/// String-keyed table of JSON blobs.
///
/// Implementations must be thread-safe (`Send + Sync`) and make each single
/// `set`/`remove` durable before returning. There are no multi-key
/// transactions; callers tolerate a crash between two writes.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Create or overwrite the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Returns `Ok(true)` if it existed.
    fn remove(&self, key: &str) -> Result<bool>;

    /// All keys starting with `prefix`, sorted.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
