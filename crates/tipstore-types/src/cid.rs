use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content identifier for a blob held by the remote content network.
///
/// A `Cid` is opaque to everything above the content store: it is produced at
/// write time, recorded in the local index, and handed back to the store to
/// read the blob. Writing different bytes always yields a different `Cid`, so
/// the identifier of a logical entity changes on every rewrite.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cid(String);

impl Cid {
    /// Parse a content identifier, rejecting empty or whitespace-bearing input.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidCid(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Wrap a hex digest produced by a content hasher.
    pub fn from_hex_digest(digest: [u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 characters) for logs.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(12)
            .map_or(self.0.len(), |(i, _)| i);
        &self.0[..end]
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({})", self.short())
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Cid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
