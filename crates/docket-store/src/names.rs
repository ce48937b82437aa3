//! Collection name validation.
//!
//! Valid collection names:
//! - Must be non-empty and at most [`MAX_NAME_LEN`] bytes
//! - Must consist of ASCII letters, digits, `-` and `_`
//! - Must not start with `-` or `_`
//!
//! Names map one-to-one onto file names in the data directory, so these
//! rules also rule out path separators, `..` and hidden files.

use crate::error::{StoreError, StoreResult};

/// Longest accepted collection name, in bytes.
pub const MAX_NAME_LEN: usize = 64;

/// Validate a collection name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use docket_store::names::validate_collection_name;
///
/// assert!(validate_collection_name("people").is_ok());
/// assert!(validate_collection_name("audit_log-2").is_ok());
/// assert!(validate_collection_name("").is_err());
/// assert!(validate_collection_name("../etc").is_err());
/// ```
pub fn validate_collection_name(name: &str) -> StoreResult<()> {
    let invalid = |reason: String| StoreError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("must not be empty".into()));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(invalid(format!("longer than {MAX_NAME_LEN} bytes")));
    }

    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }

    if name.starts_with('-') || name.starts_with('_') {
        return Err(invalid("must not start with '-' or '_'".into()));
    }

    Ok(())
}
