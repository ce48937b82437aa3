//! HTTP server for docket.
//!
//! Exposes generic document CRUD over HTTP. Every route goes through the
//! [`AccessGate`](docket_gate::AccessGate); user management and collection
//! lifecycle are command-line only.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::HealthResponse;
pub use server::DocketServer;
