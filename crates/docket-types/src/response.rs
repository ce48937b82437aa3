//! Response bodies returned to adapters.
//!
//! Field names are part of the external contract and must not change.

use serde::{Deserialize, Serialize};

use crate::document::{DocId, Document};

/// `{"ID": <int>}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResponse {
    #[serde(rename = "ID")]
    pub id: DocId,
}

/// `{"IDs": [<int>, ...]}`, in input order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateManyResponse {
    #[serde(rename = "IDs")]
    pub ids: Vec<DocId>,
}

/// Outcome of a read.
///
/// Serializes untagged: a single document object, an array of documents,
/// or `null` when a first-match read found nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadResult {
    One(Document),
    All(Vec<Document>),
    NoMatch,
}

impl ReadResult {
    /// Returns `true` if nothing matched.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(_) => false,
            Self::All(docs) => docs.is_empty(),
            Self::NoMatch => true,
        }
    }

    /// All matched documents, flattened.
    pub fn into_documents(self) -> Vec<Document> {
        match self {
            Self::One(doc) => vec![doc],
            Self::All(docs) => docs,
            Self::NoMatch => Vec::new(),
        }
    }
}

/// `{"response": <document | [document] | null>}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadResponse {
    pub response: ReadResult,
}

/// `{"updated_doc_ids": [<int>, ...]}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub updated_doc_ids: Vec<DocId>,
}

/// `{"deleted_doc_ids": [<int>, ...]}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted_doc_ids: Vec<DocId>,
}

/// `{"collections": [<name>, ...]}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionsResponse {
    pub collections: Vec<String>,
}
