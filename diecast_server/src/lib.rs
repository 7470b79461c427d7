//! HTTP surface for the aggregator.
//!
//! - `GET /search?q=` runs one aggregation and returns the merged listings
//! - `GET /health` reports liveness and the number of registered sources
//! - `GET /sources` lists the registered sources

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use diecast_core::{AdapterError, Aggregator, ConfigError, SearchError, SourceInfo};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

/// Failures that stop the server before or while serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("source setup failed: {0}")]
    Adapter(#[from] AdapterError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub sources: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Maps aggregation failures onto HTTP responses.
pub struct ApiError(SearchError);

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            SearchError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Missing query"),
            SearchError::NoResults => (StatusCode::NOT_FOUND, "No results found"),
            SearchError::Internal(detail) => {
                error!(code = self.0.code_str(), detail = %detail, "search failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(search))
        .route("/health", get(health))
        .route("/sources", get(sources))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let raw = params.q.unwrap_or_default();
    let listings = state.aggregator.search(&raw).await?;
    Ok(Json(listings).into_response())
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sources: state.aggregator.registry().len(),
    })
}

async fn sources(State(state): State<AppState>) -> Json<Vec<SourceInfo>> {
    Json(state.aggregator.registry().list_sources())
}
