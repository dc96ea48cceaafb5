//! HTTP daemon/server mode for `stringstore`.
//!
//! This module exposes a small HTTP+JSON resource API over the store
//! layer:
//!
//! - `GET  /v1/health` – simple health check endpoint.
//! - `POST /v1/strings` – analyze and store a new value.
//! - `GET  /v1/strings` – list records matching structured filter
//!   query parameters.
//! - `GET  /v1/strings/search` – list records matching a filter
//!   derived from free-form text via the natural-language extractor.
//! - `GET  /v1/strings/{value}` – fetch one record by value.
//! - `DELETE /v1/strings/{value}` – remove one record by value.
//! - `POST /v1/analyze` – analyze a value without storing it.
//!
//! The server is intentionally thin: it performs JSON
//! (de)serialization, delegates to the store layer, and converts
//! errors into JSON HTTP responses. The store configuration is fixed
//! at startup and injected as router state; no per-request backend
//! selection happens.

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::analysis;
use crate::models::{
    AnalyzeResponse, CreateRequest, Filter, ListResponse, Record, SearchResponse, StoreConfig,
};
use crate::query::natural;
use crate::store::{self, StoreError};

/// Simple health-check response payload.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// JSON error body returned by the API.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Query parameters for the natural-language search endpoint.
#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
}

/// Error type used by HTTP handlers to map store failures into JSON
/// error responses.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::Conflict { .. } => StatusCode::CONFLICT,
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Build the Axum router for the stringstore HTTP API.
pub fn router(config: StoreConfig) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/strings", post(create_string).get(list_strings))
        .route("/v1/strings/search", get(search_strings))
        .route("/v1/strings/:value", get(get_string).delete(delete_string))
        .route("/v1/analyze", post(analyze_value))
        .with_state(config)
}

/// Run the HTTP server bound to the provided socket address.
///
/// This is used by the CLI `stringstore serve` subcommand.
pub async fn run(addr: SocketAddr, config: StoreConfig) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_with_listener(listener, config).await
}

/// Run the HTTP server using an existing `TcpListener`.
///
/// This is primarily used in tests to bind to an ephemeral port.
pub async fn serve_with_listener(listener: TcpListener, config: StoreConfig) -> Result<()> {
    let app = router(config);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn create_string(
    State(config): State<StoreConfig>,
    Json(request): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let value = analysis::normalize_value(&request.value)
        .ok_or_else(|| ApiError::bad_request("value must not be empty"))?;

    let mut backend = store::open_backend(&config)?;
    let record = backend.create(&value)?;

    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_strings(
    State(config): State<StoreConfig>,
    Query(filter): Query<Filter>,
) -> Result<Json<ListResponse>, ApiError> {
    let backend = store::open_backend(&config)?;
    let records = backend.list(&filter)?;

    Ok(Json(ListResponse {
        count: records.len(),
        records,
    }))
}

async fn search_strings(
    State(config): State<StoreConfig>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let filter = natural::extract_filter(&params.q);
    if filter.is_empty() {
        return Err(ApiError::bad_request(format!(
            "could not derive a filter from {:?}",
            params.q
        )));
    }

    let backend = store::open_backend(&config)?;
    let records = backend.list(&filter)?;

    Ok(Json(SearchResponse {
        query: params.q,
        filter,
        count: records.len(),
        records,
    }))
}

async fn get_string(
    State(config): State<StoreConfig>,
    Path(value): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let backend = store::open_backend(&config)?;
    let record = backend.get(&value)?;
    Ok(Json(record))
}

async fn delete_string(
    State(config): State<StoreConfig>,
    Path(value): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut backend = store::open_backend(&config)?;
    backend.delete(&value)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn analyze_value(
    Json(request): Json<CreateRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let value = analysis::normalize_value(&request.value)
        .ok_or_else(|| ApiError::bad_request("value must not be empty"))?;

    let properties = analysis::analyze(&value);
    Ok(Json(AnalyzeResponse { value, properties }))
}
