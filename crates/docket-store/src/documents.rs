use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use docket_types::{DocId, Document, Fields, Query, Value};

use crate::error::{StoreError, StoreResult};

/// In-memory working set of one collection.
///
/// This is also the persisted form:
///
/// ```text
/// {
///     "documents": { "1": { "age": 30, "name": "alice" } },
///     "next_id": 2
/// }
/// ```
///
/// Documents are kept in id order, which is the scan order for every query.
/// Mutating methods mark the set dirty; a [`Collection`](crate::Collection)
/// only rewrites the file when something actually changed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Documents {
    documents: BTreeMap<DocId, Fields>,
    next_id: DocId,
    #[serde(skip)]
    dirty: bool,
}

impl Default for Documents {
    fn default() -> Self {
        Self {
            documents: BTreeMap::new(),
            next_id: DocId::FIRST,
            dirty: false,
        }
    }
}

impl Documents {
    /// Restore the id counter invariant after loading: the next id is
    /// always greater than every id ever stored.
    pub(crate) fn normalize(&mut self) -> StoreResult<()> {
        if let Some(max) = self.documents.keys().next_back() {
            if self.next_id <= *max {
                self.next_id = max.checked_next().ok_or(StoreError::IdSpaceExhausted)?;
            }
        }
        if self.next_id < DocId::FIRST {
            self.next_id = DocId::FIRST;
        }
        Ok(())
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the collection holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Fetch one document by id.
    pub fn get(&self, id: DocId) -> Option<Document> {
        self.documents
            .get(&id)
            .map(|fields| Document::new(id, fields.clone()))
    }

    /// Insert a document, assigning it the next id.
    ///
    /// Fails with `IdSpaceExhausted` once the counter reaches `u64::MAX`.
    pub fn insert(&mut self, fields: Fields) -> StoreResult<DocId> {
        let id = self.next_id;
        self.next_id = id.checked_next().ok_or(StoreError::IdSpaceExhausted)?;
        self.documents.insert(id, fields);
        self.dirty = true;
        Ok(id)
    }

    /// All documents matching `query`, in id order.
    pub fn find(&self, query: &Query) -> Vec<Document> {
        self.documents
            .iter()
            .filter(|(_, fields)| query.matches(fields))
            .map(|(id, fields)| Document::new(*id, fields.clone()))
            .collect()
    }

    /// The first document matching `query`, in id order.
    pub fn find_first(&self, query: &Query) -> Option<Document> {
        self.documents
            .iter()
            .find(|(_, fields)| query.matches(fields))
            .map(|(id, fields)| Document::new(*id, fields.clone()))
    }

    /// Returns `true` if any document matches `query`.
    pub fn any(&self, query: &Query) -> bool {
        self.documents.values().any(|fields| query.matches(fields))
    }

    /// Number of documents matching `query`.
    pub fn count(&self, query: &Query) -> usize {
        self.documents
            .values()
            .filter(|fields| query.matches(fields))
            .count()
    }

    /// Set `field = value` on every document matching `query`.
    ///
    /// Returns the affected ids in scan order.
    pub fn update(&mut self, query: &Query, field: &str, value: &Value) -> Vec<DocId> {
        let mut updated = Vec::new();
        for (id, fields) in self.documents.iter_mut() {
            if query.matches(fields) {
                fields.insert(field.to_string(), value.clone());
                updated.push(*id);
            }
        }
        if !updated.is_empty() {
            self.dirty = true;
        }
        updated
    }

    /// Remove every document matching `query`. Remaining ids are untouched.
    ///
    /// Returns the removed ids in scan order.
    pub fn remove(&mut self, query: &Query) -> Vec<DocId> {
        let removed: Vec<DocId> = self
            .documents
            .iter()
            .filter(|(_, fields)| query.matches(fields))
            .map(|(id, _)| *id)
            .collect();
        for id in &removed {
            self.documents.remove(id);
        }
        if !removed.is_empty() {
            self.dirty = true;
        }
        removed
    }

    /// Iterate over all documents in id order.
    pub fn iter(&self) -> impl Iterator<Item = Document> + '_ {
        self.documents
            .iter()
            .map(|(id, fields)| Document::new(*id, fields.clone()))
    }
}
