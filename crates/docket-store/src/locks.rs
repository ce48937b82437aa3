use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{StoreError, StoreResult};

/// One exclusive lock per collection name.
///
/// Locks are created on first use and live as long as the table. Every
/// handle for the same name shares the same lock, so loading, mutating and
/// persisting a collection is serialized across all handles of a database.
#[derive(Debug, Default)]
pub(crate) struct LockTable {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The lock guarding `name`.
    pub(crate) fn get(&self, name: &str) -> StoreResult<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(Arc::clone(locks.entry(name.to_string()).or_default()))
    }
}
