use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{discover, handlers, media, middleware::metrics_middleware, mood};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Mood discovery (full pipeline)
        .route("/moods", get(handlers::list_moods))
        .route("/mood/{mood}", get(mood::discover_mood))
        // Raw catalog aggregation
        .route("/aggregate-discover", get(discover::aggregate_discover))
        .route("/aggregate-discover-tv", get(discover::aggregate_discover_tv))
        // Media search aggregation
        .route("/aggregate-search", get(media::aggregate_search))
        // Passthrough lookups
        .route("/detail/{kind}/{id}", get(discover::get_detail))
        .route("/providers/{kind}/{id}", get(discover::get_providers))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
