//! File-backed document storage for docket.
//!
//! A [`Database`] is a directory holding one JSON file per collection. It
//! acts as the collection registry: it enumerates, materializes and destroys
//! collections, and hands out [`Collection`] handles for the ones that exist.
//! A [`Collection`] owns the create/read/update/delete lifecycle of the
//! documents inside one file.
//!
//! # Design Rules
//!
//! 1. A collection must be materialized before it can be opened.
//! 2. Every operation is a full load -> mutate in memory -> full persist cycle.
//! 3. All operations on one collection name run under one exclusive lock,
//!    so there is exactly one writer per collection at a time.
//! 4. Persistence writes a temporary file and renames it over the target;
//!    a reader never sees a torn write.
//! 5. Document ids come from a persisted counter and are never reused.
//! 6. Multi-process access to the same data directory is unsupported.

pub mod collection;
pub mod config;
pub mod database;
pub mod documents;
pub mod error;
mod file;
mod locks;
pub mod names;

pub use collection::Collection;
pub use config::StoreConfig;
pub use database::Database;
pub use documents::Documents;
pub use error::{StoreError, StoreResult};
pub use names::validate_collection_name;
