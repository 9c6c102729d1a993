//! Media search aggregation endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use vibescout_core::MediaTrack;

use super::handlers::{discovery_error_response, ErrorResponse};
use crate::metrics::{FLOOR_MISSES_TOTAL, QUOTA_TRIPS_TOTAL, RELAXED_PASSES_TOTAL};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    /// Mood whose keyword phrase seeds the search when `q` is absent.
    pub mood: Option<String>,
    pub limit: Option<u32>,
    /// Comma-separated strategy override; replaces the built-in ladder.
    pub strategies: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub items: Vec<MediaTrack>,
    pub total: usize,
    pub met_floor: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub used_relaxed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub quota_exceeded: bool,
}

/// GET /api/v1/aggregate-search
///
/// Run the strategy ladder for `q`, merge stats, filter and rank tracks.
/// With `mood=` instead of `q=`, the mood's keyword phrase seeds the ladder.
pub async fn aggregate_search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let q = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => q.to_string(),
        None => match &query.mood {
            Some(mood) => state
                .discovery()
                .resolve_mood(mood)
                .map_err(discovery_error_response)?
                .keywords
                .clone(),
            None => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "Missing query parameter: q or mood".to_string(),
                    }),
                ))
            }
        },
    };

    let limit = query
        .limit
        .unwrap_or(state.config().pipeline.max_search_results);
    let strategies = query.strategies.as_deref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    });

    let outcome = state
        .discovery()
        .search_media(&q, strategies, limit)
        .await
        .map_err(discovery_error_response)?;

    if outcome.used_relaxed {
        RELAXED_PASSES_TOTAL
            .with_label_values(&["aggregate-search"])
            .inc();
    }
    if !outcome.met_floor {
        FLOOR_MISSES_TOTAL
            .with_label_values(&["aggregate-search"])
            .inc();
    }
    if outcome.quota_exceeded {
        QUOTA_TRIPS_TOTAL
            .with_label_values(&["aggregate-search"])
            .inc();
        if outcome.items.is_empty() {
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Upstream quota exceeded".to_string(),
                }),
            ));
        }
    }

    Ok(Json(SearchResponse {
        query: q,
        total: outcome.items.len(),
        items: outcome.items,
        met_floor: outcome.met_floor,
        used_relaxed: outcome.used_relaxed,
        quota_exceeded: outcome.quota_exceeded,
    }))
}
