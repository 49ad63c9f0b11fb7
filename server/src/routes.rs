//! HTTP routes.
//!
//! Validation failures map to 400, every other failure to 500. Error bodies
//! are `{"detail": "<message>"}`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use rag_retrieval::{Answer, NewDocument, RetrievalError, RetrievalService};

/// Shared handler state.
pub type AppState = Arc<RetrievalService>;

/// Build the application router.
pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/add-documents", post(add_documents))
        .route("/query", post(query))
        .route("/health", get(health))
        .with_state(service)
}

/// Response of `POST /add-documents`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddDocumentsResponse {
    pub message: String,
}

/// Body of `POST /query`.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

/// Response of `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
    pub documents: usize,
}

async fn add_documents(
    State(service): State<AppState>,
    Json(documents): Json<Vec<NewDocument>>,
) -> Result<Json<AddDocumentsResponse>, ApiError> {
    let stored = service.ingest(documents).await?;
    info!("Added {stored} documents");

    Ok(Json(AddDocumentsResponse {
        message: format!("Successfully added {stored} documents"),
    }))
}

async fn query(
    State(service): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Answer>, ApiError> {
    let answer = service.answer(&request.question).await?;
    Ok(Json(answer))
}

async fn health(State(service): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let store = service.store();
    let documents = store
        .count()
        .await
        .map_err(|err| ApiError::internal(err.to_string()))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        store: store.name().to_string(),
        documents,
    }))
}

/// An error rendered as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn internal(detail: String) -> Self {
        error!("Request failed: {detail}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail,
        }
    }
}

impl From<RetrievalError> for ApiError {
    fn from(err: RetrievalError) -> Self {
        if err.is_validation() {
            warn!("Rejected request: {err}");
            return Self {
                status: StatusCode::BAD_REQUEST,
                detail: err.to_string(),
            };
        }
        Self::internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "detail": self.detail })),
        )
            .into_response()
    }
}
