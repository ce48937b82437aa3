//! Foundation types for docket.
//!
//! This crate provides the data model shared by every other docket crate:
//! the typed field [`Value`], the boundary coercion that produces it, the
//! [`Document`] and [`Query`] shapes, and the response bodies returned to
//! adapters.
//!
//! # Key Types
//!
//! - [`Value`]: Closed union of `Integer`, `Text` and raw JSON
//! - [`coerce`]: Text to [`Value`] conversion applied to inbound literals
//! - [`DocId`]: Store-assigned document identifier, never reused
//! - [`Query`]: Single-field equality predicate
//! - [`ErrorKind`]: Error taxonomy surfaced at the adapter boundary

pub mod document;
pub mod error;
pub mod response;
pub mod value;

pub use document::{DocId, Document, Fields, Query};
pub use error::ErrorKind;
pub use response::{
    CollectionsResponse, CreateManyResponse, CreateResponse, DeleteResponse, ReadResponse,
    ReadResult, UpdateResponse,
};
pub use value::{coerce, coerce_json, Value};
