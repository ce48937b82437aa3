//! Access policy for docket.
//!
//! Every adapter call goes through the [`AccessGate`] before it reaches a
//! collection. The gate enforces two rules:
//!
//! 1. The reserved [`USERS_COLLECTION`] is never reachable through generic
//!    create/read/update/delete; users are managed only through the
//!    [`UserDirectory`].
//! 2. Privileged operations (destroying a collection, creating a user) need
//!    a successful admin authentication in the same call.
//!
//! # Quick Start
//!
//! ```rust
//! use docket_gate::{AccessGate, AdminCredentials};
//! use docket_store::{Database, StoreConfig};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let gate = AccessGate::new(Database::open(StoreConfig::new(dir.path())).unwrap());
//!
//! gate.bootstrap_admin("root", "secret").unwrap();
//! assert!(gate.authenticate_admin(&AdminCredentials::new("root", "secret")).unwrap());
//!
//! gate.create_collection("people").unwrap();
//! let created = gate.create("people", Default::default()).unwrap();
//! assert_eq!(created.id.get(), 1);
//! ```

pub mod error;
pub mod gate;
pub mod users;

pub use error::{GateError, GateResult};
pub use gate::{AccessGate, AdminCredentials};
pub use users::{confirm_password, Role, UserDirectory, USERS_COLLECTION};
