use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::{ErrorKind, ResolveError};
use crate::resolver::ResolveResult;

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    erro: String,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody { erro: self.1 };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

impl From<ResolveError> for ApiError {
    fn from(e: ResolveError) -> Self {
        let status = match e.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            ErrorKind::DataUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        };
        api_error(status, e.to_string())
    }
}

fn task_failed(e: tokio::task::JoinError) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("resolver task failed: {}", e))
}

// ─── GET /ubs/perto ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct NearbyQuery {
    pub cep: Option<String>,
}

pub async fn nearby(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyQuery>,
) -> Result<Json<ResolveResult>, ApiError> {
    let start = Instant::now();
    let raw = params.cep.unwrap_or_default();

    // Lookups block on the network; keep them off the async workers.
    let worker = Arc::clone(&state);
    let cep = raw.clone();
    let outcome = tokio::task::spawn_blocking(move || worker.resolver.resolve(&cep))
        .await
        .map_err(task_failed)?;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    match outcome {
        Ok(result) => {
            info!(
                "GET /ubs/perto?cep={} -> {} facilities ({:.1}ms)",
                raw,
                result.results.len(),
                elapsed_ms
            );
            Ok(Json(result))
        }
        Err(e) => {
            warn!("GET /ubs/perto?cep={} -> {} ({:.1}ms)", raw, e, elapsed_ms);
            Err(e.into())
        }
    }
}

// ─── GET /health ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub facilities: usize,
    pub skipped_rows: usize,
    pub limit: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    let worker = Arc::clone(&state);
    let catalog = tokio::task::spawn_blocking(move || worker.resolver.catalog())
        .await
        .map_err(task_failed)??;

    Ok(Json(HealthResponse {
        status: "ok",
        facilities: catalog.len(),
        skipped_rows: catalog.skipped(),
        limit: state.resolver.limit(),
    }))
}
