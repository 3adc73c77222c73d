//! Content-addressed storage boundary for tipstore.
//!
//! Everything tipstore persists remotely goes through the [`ContentStore`]
//! trait: write a payload, get back a CID, read the payload again by that CID.
//! Blobs are immutable and never deleted; this crate keeps no index of them.
//!
//! # Storage Backends
//!
//! - [`InMemoryContentStore`] -- `HashMap`-based store with failure injection
//!   for tests and embedding
//! - [`FsContentStore`] -- sharded directory of blobs for local operation
//!
//! # Write Rules
//!
//! 1. Payloads larger than [`MAX_PAYLOAD_SIZE`] are rejected before any I/O.
//! 2. The allowance check runs before every write.
//! 3. Reads verify the bytes against the CID before returning them.

pub mod error;
pub mod fs;
pub mod hasher;
pub mod memory;
pub mod traits;
pub mod url;

pub use error::{ContentError, ContentResult};
pub use fs::FsContentStore;
pub use hasher::ContentHasher;
pub use memory::InMemoryContentStore;
pub use traits::{Allowance, ContentStore, StoreReceipt, MAX_PAYLOAD_SIZE};
pub use url::PublicUrlResolver;
