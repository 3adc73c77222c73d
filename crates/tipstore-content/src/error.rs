use tipstore_types::Cid;

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The serialized payload exceeds the network's size ceiling.
    #[error("payload of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { size: u64, max: u64 },

    /// The pre-write allowance check says the account cannot pay for the write.
    #[error("insufficient allowance: write needs {required} bytes, {available} available")]
    InsufficientAllowance { required: u64, available: u64 },

    /// The blob could not be fetched or failed verification.
    #[error("content {cid} not retrievable: {reason}")]
    NotRetrievable { cid: Cid, reason: String },

    /// The remote network is unreachable.
    #[error("content store unavailable: {0}")]
    Unavailable(String),

    /// I/O error from a local backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContentError {
    pub(crate) fn not_retrievable(cid: &Cid, reason: impl Into<String>) -> Self {
        Self::NotRetrievable {
            cid: cid.clone(),
            reason: reason.into(),
        }
    }
}

/// Result alias for content store operations.
pub type ContentResult<T> = Result<T, ContentError>;
