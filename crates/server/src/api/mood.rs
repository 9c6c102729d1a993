//! Mood discovery endpoint: the full pipeline behind one GET.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use vibescout_core::CatalogItem;

use super::handlers::{discovery_error_response, ErrorResponse};
use crate::metrics::{FLOOR_MISSES_TOTAL, QUOTA_TRIPS_TOTAL, RELAXED_PASSES_TOTAL};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    pub count: Option<usize>,
    pub relax: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct MoodDiscoveryResponse {
    pub mood: String,
    pub results: Vec<CatalogItem>,
    pub count: usize,
    pub met_floor: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub used_relaxed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub quota_exceeded: bool,
}

/// GET /api/v1/mood/{mood}
///
/// Aggregate, filter, rank and interleave movies and series for a mood.
/// `count` bounds the mixed result, `relax=false` disables the degraded
/// second pass.
pub async fn discover_mood(
    State(state): State<Arc<AppState>>,
    Path(mood): Path<String>,
    Query(query): Query<MoodQuery>,
) -> Result<Json<MoodDiscoveryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let target = query.count.unwrap_or(state.config().pipeline.catalog_floor);
    let relax = query.relax.unwrap_or(true);

    let outcome = state
        .discovery()
        .discover_mood(&mood, target, relax)
        .await
        .map_err(discovery_error_response)?;

    if outcome.used_relaxed {
        RELAXED_PASSES_TOTAL.with_label_values(&["mood"]).inc();
    }
    if !outcome.met_floor {
        FLOOR_MISSES_TOTAL.with_label_values(&["mood"]).inc();
    }
    if outcome.quota_exceeded {
        QUOTA_TRIPS_TOTAL.with_label_values(&["mood"]).inc();
        if outcome.items.is_empty() {
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Upstream quota exceeded".to_string(),
                }),
            ));
        }
    }

    Ok(Json(MoodDiscoveryResponse {
        mood: mood.trim().to_lowercase(),
        count: outcome.items.len(),
        results: outcome.items,
        met_floor: outcome.met_floor,
        used_relaxed: outcome.used_relaxed,
        quota_exceeded: outcome.quota_exceeded,
    }))
}
