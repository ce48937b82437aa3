use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use docket_types::{DocId, Document, Fields, Query, ReadResult, Value};

use crate::documents::Documents;
use crate::error::{StoreError, StoreResult};
use crate::file;

/// Document store bound to one materialized collection.
///
/// Obtained from [`Database::collection`](crate::Database::collection).
/// Every call takes the collection's exclusive lock, loads the whole file,
/// works on it in memory and, if anything changed, atomically rewrites it
/// before releasing the lock. Handles are cheap to clone and all handles for
/// the same name share one lock.
#[derive(Clone, Debug)]
pub struct Collection {
    name: String,
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl Collection {
    pub(crate) fn new(name: String, path: PathBuf, lock: Arc<Mutex<()>>) -> Self {
        Self { name, path, lock }
    }

    /// The collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The file backing this collection.
    pub fn location(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the collection's documents under the exclusive lock,
    /// persisting afterwards if `f` changed anything.
    ///
    /// If `f` fails, nothing is written and the previous file stays intact.
    /// This is the building block for multi-step check-then-write operations
    /// that must not interleave with other writers.
    pub fn modify<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Documents) -> Result<T, E>,
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        let mut docs = file::load(&self.path, &self.name)?;
        let out = f(&mut docs)?;
        if docs.is_dirty() {
            file::persist(&self.path, &docs)?;
        }
        Ok(out)
    }

    /// Run `f` against a consistent snapshot of the documents.
    pub fn inspect<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Documents) -> T,
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        let docs = file::load(&self.path, &self.name)?;
        Ok(f(&docs))
    }

    /// Insert one document and return its assigned id.
    pub fn create(&self, fields: Fields) -> StoreResult<DocId> {
        let id = self.modify(|docs| docs.insert(fields))?;
        debug!(collection = %self.name, %id, "document created");
        Ok(id)
    }

    /// Insert several documents in one write. Ids are returned in input order.
    pub fn create_many(&self, batch: Vec<Fields>) -> StoreResult<Vec<DocId>> {
        let ids = self.modify(|docs| {
            batch
                .into_iter()
                .map(|fields| docs.insert(fields))
                .collect::<StoreResult<Vec<DocId>>>()
        })?;
        debug!(collection = %self.name, count = ids.len(), "documents created");
        Ok(ids)
    }

    /// Select documents by `query`.
    ///
    /// With `return_all` unset, returns the first match in id order or
    /// [`ReadResult::NoMatch`]. With it set, returns every match, possibly none.
    pub fn read(&self, query: &Query, return_all: bool) -> StoreResult<ReadResult> {
        let result = self.inspect(|docs| {
            if return_all {
                ReadResult::All(docs.find(query))
            } else {
                docs.find_first(query).map_or(ReadResult::NoMatch, ReadResult::One)
            }
        })?;
        debug!(collection = %self.name, %query, return_all, empty = result.is_empty(), "read");
        Ok(result)
    }

    /// Every document matching `query`, in id order.
    pub fn find(&self, query: &Query) -> StoreResult<Vec<Document>> {
        self.inspect(|docs| docs.find(query))
    }

    /// Set `field = value` on every document matching `query`.
    ///
    /// Returns the affected ids. With no match nothing is written.
    pub fn update(&self, query: &Query, field: &str, value: Value) -> StoreResult<Vec<DocId>> {
        let ids = self.modify(|docs| Ok::<_, StoreError>(docs.update(query, field, &value)))?;
        debug!(collection = %self.name, %query, field, matched = ids.len(), "update");
        Ok(ids)
    }

    /// Remove every document matching `query`.
    ///
    /// Returns the removed ids. Remaining documents keep their ids. With no
    /// match nothing is written.
    pub fn delete(&self, query: &Query) -> StoreResult<Vec<DocId>> {
        let ids = self.modify(|docs| Ok::<_, StoreError>(docs.remove(query)))?;
        debug!(collection = %self.name, %query, matched = ids.len(), "delete");
        Ok(ids)
    }

    /// Every document, in id order.
    pub fn documents(&self) -> StoreResult<Vec<Document>> {
        self.inspect(|docs| docs.iter().collect())
    }

    /// Number of documents.
    pub fn len(&self) -> StoreResult<usize> {
        self.inspect(Documents::len)
    }

    /// Returns `true` if the collection holds no documents.
    pub fn is_empty(&self) -> StoreResult<bool> {
        self.inspect(Documents::is_empty)
    }
}
