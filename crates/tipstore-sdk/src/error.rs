use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    /// Startup checks failed. The next call retries them.
    #[error("storage initialization failed: {0}")]
    InitializationFailed(String),

    #[error("repository error: {0}")]
    Repo(#[from] tipstore_repo::RepoError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type SdkResult<T> = Result<T, SdkError>;
