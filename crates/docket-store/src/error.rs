use docket_types::ErrorKind;

/// Errors from collection and document operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The collection has not been materialized.
    #[error("collection not found: {0}")]
    NotFound(String),

    /// The collection already exists.
    #[error("collection already exists: {0}")]
    AlreadyExists(String),

    /// The collection name cannot be mapped to a storage location.
    #[error("invalid collection name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// Every document id has been handed out.
    #[error("document id space exhausted")]
    IdSpaceExhausted,

    /// The collection file exists but cannot be decoded.
    #[error("corrupt collection {name}: {reason}")]
    Corrupt { name: String, reason: String },

    /// Serialization failure while persisting.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A collection lock was poisoned by a panicking holder.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    /// Classify this error for the adapter boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::InvalidName { .. } => ErrorKind::InvalidInput,
            Self::IdSpaceExhausted
            | Self::Corrupt { .. }
            | Self::Serialization(_)
            | Self::Io(_)
            | Self::LockPoisoned(_) => ErrorKind::Internal,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
