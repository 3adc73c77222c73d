use tipstore_types::Cid;

/// Domain-separated BLAKE3 hasher that derives content identifiers.
///
/// The domain tag is prepended to every hash computation, so the same bytes
/// hashed under two domains never share a CID.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for stored entity documents.
    pub const BLOB: Self = Self {
        domain: "tipstore-blob-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn digest(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Derive the content identifier for `data`.
    pub fn cid(&self, data: &[u8]) -> Cid {
        Cid::from_hex_digest(self.digest(data))
    }

    /// Verify that data produces the expected content identifier.
    pub fn verify(&self, data: &[u8], expected: &Cid) -> bool {
        self.cid(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
