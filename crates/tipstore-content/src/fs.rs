//! Directory-backed content store.
//!
//! Stands in for the remote network when running locally: every blob is a
//! file at `<root>/<cid[0..2]>/<cid>`. Writes go to a temporary file first
//! and are renamed into place, so a crash never leaves a partial blob under
//! its final name.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tipstore_types::Cid;
use tracing::debug;

use crate::error::{ContentError, ContentResult};
use crate::hasher::ContentHasher;
use crate::traits::{Allowance, ContentStore, MAX_PAYLOAD_SIZE};
use crate::url::PublicUrlResolver;

/// Content store that keeps blobs in a sharded directory tree.
#[derive(Debug)]
pub struct FsContentStore {
    root: PathBuf,
    resolver: PublicUrlResolver,
    max_payload: u64,
}

impl FsContentStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, resolver: PublicUrlResolver) -> ContentResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            resolver,
            max_payload: MAX_PAYLOAD_SIZE,
        })
    }

    /// Lower the payload ceiling. Values above the network limit are clamped.
    pub fn with_max_payload_size(mut self, bytes: u64) -> Self {
        self.max_payload = bytes.min(MAX_PAYLOAD_SIZE);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for a CID, or `None` if the CID is not one this store could have
    /// produced.
    fn path_for(&self, cid: &Cid) -> Option<PathBuf> {
        let s = cid.as_str();
        if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(self.root.join(&s[..2]).join(s))
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn write_blob(&self, payload: &[u8]) -> ContentResult<Cid> {
        let cid = ContentHasher::BLOB.cid(payload);
        let path = self
            .path_for(&cid)
            .ok_or_else(|| ContentError::Unavailable(format!("unusable cid {cid}")))?;

        if tokio::fs::try_exists(&path).await? {
            debug!(cid = %cid.short(), "blob already present");
            return Ok(cid);
        }
        if let Some(shard) = path.parent() {
            tokio::fs::create_dir_all(shard).await?;
        }
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, payload).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(cid)
    }

    async fn retrieve(&self, cid: &Cid) -> ContentResult<Vec<u8>> {
        let path = self
            .path_for(cid)
            .ok_or_else(|| ContentError::not_retrievable(cid, "malformed cid"))?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| ContentError::not_retrievable(cid, e.to_string()))?;
        if !ContentHasher::BLOB.verify(&data, cid) {
            return Err(ContentError::not_retrievable(cid, "hash mismatch"));
        }
        Ok(data)
    }

    async fn check_allowance(&self, _size: u64) -> ContentResult<Allowance> {
        Ok(Allowance::UNLIMITED)
    }

    fn resolve_public_url(&self, cid: &Cid) -> String {
        self.resolver.resolve(cid)
    }

    fn max_payload_size(&self) -> u64 {
        self.max_payload
    }

    async fn health(&self) -> ContentResult<()> {
        let meta = tokio::fs::metadata(&self.root).await?;
        if !meta.is_dir() {
            return Err(ContentError::Unavailable(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        Ok(())
    }
}
