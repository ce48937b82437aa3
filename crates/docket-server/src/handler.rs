use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use docket_gate::{AccessGate, GateResult};
use docket_types::{
    coerce_json, CollectionsResponse, CreateManyResponse, CreateResponse, DeleteResponse, Fields,
    ReadResponse, UpdateResponse,
};

use crate::error::{ServerError, ServerResult};

/// Health check response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Run a store call on the blocking pool.
async fn blocking<T, F>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> GateResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .map_err(ServerError::from)
}

fn object_fields(value: serde_json::Value) -> ServerResult<Fields> {
    match value {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, coerce_json(v)))
            .collect()),
        other => Err(ServerError::InvalidBody(format!(
            "expected a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn parse_body(body: &Bytes) -> ServerResult<serde_json::Value> {
    serde_json::from_slice(body).map_err(|e| ServerError::InvalidBody(e.to_string()))
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn list_handler(
    State(gate): State<AccessGate>,
) -> ServerResult<Json<CollectionsResponse>> {
    blocking(move || gate.list_collections()).await.map(Json)
}

/// `POST /create/:collection` with a JSON object body. String values are
/// coerced; other JSON values are stored as-is.
pub async fn create_handler(
    State(gate): State<AccessGate>,
    Path(collection): Path<String>,
    body: Bytes,
) -> ServerResult<Json<CreateResponse>> {
    let fields = object_fields(parse_body(&body)?)?;
    blocking(move || gate.create(&collection, fields)).await.map(Json)
}

/// `POST /create_many/:collection` with a JSON array of objects.
pub async fn create_many_handler(
    State(gate): State<AccessGate>,
    Path(collection): Path<String>,
    body: Bytes,
) -> ServerResult<Json<CreateManyResponse>> {
    let serde_json::Value::Array(items) = parse_body(&body)? else {
        return Err(ServerError::InvalidBody("expected a JSON array of objects".into()));
    };
    let batch = items
        .into_iter()
        .map(object_fields)
        .collect::<ServerResult<Vec<_>>>()?;
    blocking(move || gate.create_many(&collection, batch)).await.map(Json)
}

pub async fn read_handler(
    State(gate): State<AccessGate>,
    Path((collection, key, value)): Path<(String, String, String)>,
) -> ServerResult<Json<ReadResponse>> {
    blocking(move || gate.read(&collection, &key, &value, false)).await.map(Json)
}

pub async fn read_all_handler(
    State(gate): State<AccessGate>,
    Path((collection, key, value)): Path<(String, String, String)>,
) -> ServerResult<Json<ReadResponse>> {
    blocking(move || gate.read(&collection, &key, &value, true)).await.map(Json)
}

pub async fn update_handler(
    State(gate): State<AccessGate>,
    Path((collection, key, value, update_key, update_value)): Path<(
        String,
        String,
        String,
        String,
        String,
    )>,
) -> ServerResult<Json<UpdateResponse>> {
    blocking(move || gate.update(&collection, &key, &value, &update_key, &update_value))
        .await
        .map(Json)
}

pub async fn delete_handler(
    State(gate): State<AccessGate>,
    Path((collection, key, value)): Path<(String, String, String)>,
) -> ServerResult<Json<DeleteResponse>> {
    blocking(move || gate.delete(&collection, &key, &value)).await.map(Json)
}
