use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use docket_gate::AccessGate;

use crate::handler;

/// Build the axum router with all docket endpoints.
pub fn build_router(gate: AccessGate) -> Router {
    Router::new()
        .route("/health", get(handler::health_handler))
        .route("/collections", get(handler::list_handler))
        .route("/create/:collection", post(handler::create_handler))
        .route("/create_many/:collection", post(handler::create_many_handler))
        .route("/read/:collection/:key/:value", get(handler::read_handler))
        .route("/read/:collection/:key/:value/all", get(handler::read_all_handler))
        .route(
            "/update/:collection/:key/:value/:update_key/:update_value",
            get(handler::update_handler),
        )
        .route("/delete/:collection/:key/:value", get(handler::delete_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(gate)
}
