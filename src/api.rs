//! REST API for the market brief orchestrator
//!
//! Exposes the brief pipeline plus liveness and health probes

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::agent::BriefOrchestrator;
use crate::error::BriefError;
use crate::models::{BriefRequest, BriefResult};

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<BriefOrchestrator>,
}

/// =============================
/// Error Response
/// =============================

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<BriefError> for ApiError {
    fn from(err: BriefError) -> Self {
        match err {
            BriefError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// =============================
/// Probes
/// =============================

async fn ping() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Orchestrator is live!" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Market Brief Endpoint
/// =============================

async fn market_brief(
    State(state): State<ApiState>,
    payload: Result<Json<BriefRequest>, JsonRejection>,
) -> Result<Json<BriefResult>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    req.validate()?;
    info!(tickers = ?req.tickers, "Received market brief request");

    let result = state.orchestrator.run(req).await;
    Ok(Json(result))
}

/// =============================
/// Router
/// =============================

pub fn create_router(orchestrator: Arc<BriefOrchestrator>) -> Router {
    let state = ApiState { orchestrator };

    Router::new()
        .route("/ping", get(ping))
        .route("/health", get(health))
        .route("/market-brief/", post(market_brief))
        .route("/market-brief", post(market_brief))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    orchestrator: Arc<BriefOrchestrator>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(orchestrator);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
