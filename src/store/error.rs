//! Local store error types.

/// Error from the durable local store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Database(String),
    #[error("failed to encode blob: {0}")]
    Encode(String),
    #[error("failed to decode blob: {0}")]
    Decode(String),
    #[error("unsupported blob version: {0}")]
    UnsupportedVersion(u32),
    #[error("blob kind mismatch: expected {expected}, found {found}")]
    WrongKind { expected: String, found: String },
    #[error("store task aborted: {0}")]
    TaskAborted(String),
}

impl From<redb::Error> for StoreError {
    fn from(error: redb::Error) -> Self {
        StoreError::Database(error.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(error: tokio::task::JoinError) -> Self {
        StoreError::TaskAborted(error.to_string())
    }
}
