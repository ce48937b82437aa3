use tokio::net::TcpListener;

use docket_gate::AccessGate;
use docket_store::Database;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// docket HTTP server.
pub struct DocketServer {
    config: ServerConfig,
    gate: AccessGate,
}

impl DocketServer {
    /// Open the configured data directory and prepare the server.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let db = Database::open(config.store_config())?;
        Ok(Self {
            config,
            gate: AccessGate::new(db),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.gate.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            "docket server listening on {} (data: {})",
            self.config.bind_addr,
            self.config.data_dir.display()
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
