use async_trait::async_trait;
use tipstore_types::{Cid, Timestamp};
use tracing::debug;

use crate::error::{ContentError, ContentResult};

/// Largest payload the content network accepts: 254 MiB.
pub const MAX_PAYLOAD_SIZE: u64 = 254 * 1024 * 1024;

/// Result of a successful write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreReceipt {
    pub cid: Cid,
    pub size: u64,
    pub written_at: Timestamp,
}

/// Answer to a pre-write allowance check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allowance {
    /// Whether the account can pay for a write of the requested size.
    pub sufficient: bool,
    /// Bytes the account can still pay for, when the backend tracks it.
    pub available: Option<u64>,
}

impl Allowance {
    pub const UNLIMITED: Self = Self {
        sufficient: true,
        available: None,
    };
}

/// Immutable content-addressed blob storage.
///
/// Implementations must satisfy these invariants:
/// - Blobs are immutable. There is no update-in-place and no delete.
/// - `retrieve` is referentially transparent: a CID always yields the same
///   bytes, and bytes that do not hash to the CID are never returned.
/// - The store never interprets payloads and keeps no index of them.
///
/// Backends implement the primitive `write_blob`; callers go through
/// [`ContentStore::store`], which enforces the size ceiling and the allowance
/// check before any bytes leave the process.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Write bytes without pre-checks and return their CID.
    async fn write_blob(&self, payload: &[u8]) -> ContentResult<Cid>;

    /// Read a blob back by CID.
    ///
    /// Any transport or verification failure is `NotRetrievable`.
    async fn retrieve(&self, cid: &Cid) -> ContentResult<Vec<u8>>;

    /// Ask whether the account can pay for a write of `size` bytes.
    async fn check_allowance(&self, size: u64) -> ContentResult<Allowance>;

    /// Public URL for a CID. Pure formatting; no network call.
    fn resolve_public_url(&self, cid: &Cid) -> String;

    /// Cheap reachability check used during startup.
    async fn health(&self) -> ContentResult<()> {
        Ok(())
    }

    /// Size ceiling enforced by [`ContentStore::store`].
    fn max_payload_size(&self) -> u64 {
        MAX_PAYLOAD_SIZE
    }

    /// Check the size ceiling and allowance, then write.
    async fn store(&self, payload: &[u8]) -> ContentResult<StoreReceipt> {
        let size = payload.len() as u64;
        let max = self.max_payload_size();
        if size > max {
            return Err(ContentError::PayloadTooLarge { size, max });
        }

        let allowance = self.check_allowance(size).await?;
        if !allowance.sufficient {
            return Err(ContentError::InsufficientAllowance {
                required: size,
                available: allowance.available.unwrap_or(0),
            });
        }

        let cid = self.write_blob(payload).await?;
        debug!(cid = %cid.short(), size, "blob stored");
        Ok(StoreReceipt {
            cid,
            size,
            written_at: Timestamp::now(),
        })
    }
}
