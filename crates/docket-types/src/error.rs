use std::fmt;

use serde::{Deserialize, Serialize};

/// Error taxonomy surfaced at the adapter boundary.
///
/// Every docket error type maps onto one of these kinds so that adapters
/// can translate failures into status codes without matching on each
/// crate's error enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Unknown collection.
    NotFound,
    /// Reserved collection via the generic path, or missing admin privilege.
    Forbidden,
    /// Malformed payload or mismatched password confirmation.
    InvalidInput,
    /// Duplicate collection or duplicate username.
    AlreadyExists,
    /// I/O, serialization or other failures of the store itself.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not found",
            Self::Forbidden => "forbidden",
            Self::InvalidInput => "invalid input",
            Self::AlreadyExists => "already exists",
            Self::Internal => "internal error",
        };
        f.write_str(s)
    }
}
