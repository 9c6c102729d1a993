use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use vibescout_core::{DiscoveryError, FetchError, SanitizedConfig};

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn metrics() -> String {
    encode_metrics()
}

#[derive(Debug, Serialize)]
pub struct MoodsResponse {
    pub moods: Vec<String>,
}

/// GET /api/v1/moods
///
/// List the known mood names.
pub async fn list_moods(State(state): State<Arc<AppState>>) -> Json<MoodsResponse> {
    Json(MoodsResponse {
        moods: state
            .discovery()
            .moods()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map pipeline errors onto HTTP statuses: unknown moods are the caller's
/// fault, quota and missing credentials mean the upstream cannot serve.
pub fn discovery_error_response(e: DiscoveryError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        DiscoveryError::UnknownMood(_) => StatusCode::BAD_REQUEST,
        DiscoveryError::Fetch(FetchError::QuotaExceeded) => StatusCode::SERVICE_UNAVAILABLE,
        DiscoveryError::Fetch(FetchError::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
        DiscoveryError::Fetch(_) => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

pub fn fetch_error_response(e: FetchError) -> (StatusCode, Json<ErrorResponse>) {
    discovery_error_response(DiscoveryError::Fetch(e))
}
