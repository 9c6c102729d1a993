//! Raw catalog aggregation and passthrough lookup handlers.
//!
//! The aggregate-discover endpoints return deduplicated, order-preserving
//! pages without filtering or ranking; the mood endpoint runs the full
//! pipeline. Unrecognized query parameters are forwarded to the upstream
//! unchanged.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use vibescout_core::pipeline::aggregate_catalog;
use vibescout_core::{CatalogItem, ContentKind, DiscoverFilters, YearFilter};

use super::handlers::{fetch_error_response, ErrorResponse};
use crate::metrics::QUOTA_TRIPS_TOTAL;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub results: Vec<CatalogItem>,
    pub count: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub quota_exceeded: bool,
}

/// Split raw query parameters into the structured filter set plus a page
/// budget. Anything unrecognized rides along to the upstream.
fn parse_filters(
    kind: ContentKind,
    mut params: HashMap<String, String>,
) -> (DiscoverFilters, Option<u32>) {
    let pages = params.remove("pages").and_then(|p| p.parse().ok());

    let genres = params
        .remove("with_genres")
        .map(|g| g.split(',').filter_map(|id| id.trim().parse().ok()).collect())
        .unwrap_or_default();

    let year_key = match kind {
        ContentKind::Movie => "primary_release_year",
        ContentKind::Series => "first_air_date_year",
    };
    let year = params
        .remove(year_key)
        .and_then(|y| y.parse().ok())
        .map(YearFilter::Exact);

    let sort_by = params.remove("sort_by");
    let min_votes = params.remove("vote_count.gte").and_then(|v| v.parse().ok());

    let extra: BTreeMap<String, String> = params.into_iter().collect();

    (
        DiscoverFilters {
            genres,
            year,
            sort_by,
            min_votes,
            extra,
        },
        pages,
    )
}

async fn aggregate_discover_kind(
    state: Arc<AppState>,
    kind: ContentKind,
    params: HashMap<String, String>,
) -> Result<Json<DiscoverResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (filters, pages) = parse_filters(kind, params);
    let pipeline = &state.config().pipeline;
    let pages = pages
        .unwrap_or(pipeline.default_pages)
        .clamp(1, pipeline.max_pages);

    let mut seen = HashSet::new();
    let mut results = Vec::new();
    let outcome = aggregate_catalog(
        state.catalog().as_ref(),
        kind,
        &filters,
        pages,
        usize::MAX,
        pipeline.fetch_concurrency,
        &mut seen,
        &mut results,
    )
    .await
    .map_err(fetch_error_response)?;

    if outcome.quota_exceeded {
        QUOTA_TRIPS_TOTAL
            .with_label_values(&["aggregate-discover"])
            .inc();
        if results.is_empty() {
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Upstream quota exceeded".to_string(),
                }),
            ));
        }
    }

    Ok(Json(DiscoverResponse {
        count: results.len(),
        results,
        quota_exceeded: outcome.quota_exceeded,
    }))
}

/// GET /api/v1/aggregate-discover
///
/// Aggregate movie discover pages: dedup and merge only.
pub async fn aggregate_discover(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DiscoverResponse>, (StatusCode, Json<ErrorResponse>)> {
    aggregate_discover_kind(state, ContentKind::Movie, params).await
}

/// GET /api/v1/aggregate-discover-tv
///
/// Aggregate series discover pages: dedup and merge only.
pub async fn aggregate_discover_tv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DiscoverResponse>, (StatusCode, Json<ErrorResponse>)> {
    aggregate_discover_kind(state, ContentKind::Series, params).await
}

fn parse_kind(kind: &str) -> Result<ContentKind, (StatusCode, Json<ErrorResponse>)> {
    match kind {
        "movie" => Ok(ContentKind::Movie),
        "tv" | "series" => Ok(ContentKind::Series),
        other => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Unknown content kind: {other}"),
            }),
        )),
    }
}

/// GET /api/v1/detail/{kind}/{id}
///
/// Item detail lookup, passed through unmodified.
pub async fn get_detail(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, u32)>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    let kind = parse_kind(&kind)?;
    state
        .catalog()
        .detail(kind, id)
        .await
        .map(Json)
        .map_err(fetch_error_response)
}

/// GET /api/v1/providers/{kind}/{id}
///
/// Watch-provider lookup, passed through unmodified.
pub async fn get_providers(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, u32)>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    let kind = parse_kind(&kind)?;
    state
        .catalog()
        .watch_providers(kind, id)
        .await
        .map(Json)
        .map_err(fetch_error_response)
}
