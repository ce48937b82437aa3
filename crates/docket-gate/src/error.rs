use docket_store::StoreError;
use docket_types::ErrorKind;

/// Errors raised by the access gate and the user directory.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Policy violation: reserved collection, or missing admin privilege.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A user with this name already exists.
    #[error("user already exists: {0}")]
    UserExists(String),

    /// Malformed request, e.g. empty credentials or mismatched confirmation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Error from the underlying store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GateError {
    /// Classify this error for the adapter boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::UserExists(_) => ErrorKind::AlreadyExists,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Store(e) => e.kind(),
        }
    }
}

/// Result alias for gate operations.
pub type GateResult<T> = Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(GateError::Forbidden("x".into()).kind(), ErrorKind::Forbidden);
        assert_eq!(GateError::UserExists("x".into()).kind(), ErrorKind::AlreadyExists);
        assert_eq!(GateError::InvalidInput("x".into()).kind(), ErrorKind::InvalidInput);
        assert_eq!(
            GateError::from(StoreError::NotFound("ghost".into())).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn store_errors_display_transparently() {
        let err = GateError::from(StoreError::NotFound("ghost".into()));
        assert_eq!(err.to_string(), "collection not found: ghost");
    }
}
