use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid content identifier: {0:?}")]
    InvalidCid(String),

    #[error("unknown entity kind: {0}")]
    UnknownKind(String),
}
