//! On-disk collection files.
//!
//! Each collection is a single pretty-printed JSON file (four-space indent,
//! sorted keys). Writes go to a temporary file in the same directory which is
//! then renamed over the target, so the file on disk is always either the
//! previous or the new complete version. A process killed between the two
//! steps can leave a stray `.tmp*` file behind; [`Database::list`] never
//! reports it as a collection.
//!
//! [`Database::list`]: crate::Database::list

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;

use crate::documents::Documents;
use crate::error::{StoreError, StoreResult};

const INDENT: &[u8] = b"    ";

/// Read a collection file.
///
/// A missing file is `NotFound`. A zero-length (or whitespace-only) file
/// loads as an empty collection.
pub(crate) fn load(path: &Path, name: &str) -> StoreResult<Documents> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(name.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Documents::default());
    }

    let mut docs: Documents =
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
    docs.normalize().map_err(|e| StoreError::Corrupt {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(docs)
}

/// Atomically replace a collection file with `docs`.
pub(crate) fn persist(path: &Path, docs: &Documents) -> StoreResult<()> {
    let tmp = write_temp(path, docs)?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

/// Write a new, empty collection file. Fails with `AlreadyExists` if the
/// target is already present, even when racing another creator.
pub(crate) fn create_new(path: &Path, name: &str) -> StoreResult<()> {
    let tmp = write_temp(path, &Documents::default())?;
    tmp.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            StoreError::AlreadyExists(name.to_string())
        } else {
            StoreError::Io(e.error)
        }
    })?;
    Ok(())
}

fn write_temp(path: &Path, docs: &Documents) -> StoreResult<NamedTempFile> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let formatter = PrettyFormatter::with_indent(INDENT);
        let mut ser = Serializer::with_formatter(tmp.as_file_mut(), formatter);
        docs.serialize(&mut ser)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
    }
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}
