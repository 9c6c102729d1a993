//! Common test utilities for endpoint testing with mock upstreams.
//!
//! Provides an in-process router with mock fetchers injected, so the full
//! HTTP surface can be exercised without network access.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use vibescout_core::{
    config::{CacheConfig, PipelineConfig, ServerConfig, TmdbConfig, YouTubeConfig},
    testing::{MockCatalogApi, MockMediaSearchApi},
    Config, DiscoveryService, MoodTable,
};

/// Re-export fixtures for test convenience
pub use vibescout_core::testing::fixtures;

/// Test fixture for endpoint testing with mock upstreams.
///
/// The mock handles share state with the router, so behavior configured on
/// them before building the fixture is visible to requests, and recorded
/// calls can be asserted afterwards.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog upstream - configure discover pages and lookups
    pub catalog: MockCatalogApi,
    /// Mock media search upstream - configure query results and stats
    pub media: MockMediaSearchApi,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Pipeline knobs shrunk so small mock datasets satisfy the floors.
pub fn test_pipeline() -> PipelineConfig {
    PipelineConfig {
        catalog_floor: 4,
        media_floor: 2,
        ..Default::default()
    }
}

impl TestFixture {
    /// Create a fixture with unconfigured mocks and the shrunk pipeline.
    pub fn new() -> Self {
        Self::with_mocks(MockCatalogApi::new(), MockMediaSearchApi::new())
    }

    /// Create a fixture with pre-configured mocks.
    pub fn with_mocks(catalog: MockCatalogApi, media: MockMediaSearchApi) -> Self {
        Self::with_pipeline(catalog, media, test_pipeline())
    }

    /// Create a fixture with pre-configured mocks and a custom pipeline.
    pub fn with_pipeline(
        catalog: MockCatalogApi,
        media: MockMediaSearchApi,
        pipeline: PipelineConfig,
    ) -> Self {
        let config = Config {
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            tmdb: TmdbConfig {
                api_key: "test-tmdb-key".to_string(),
                base_url: None,
                timeout_secs: 10,
            },
            youtube: YouTubeConfig {
                api_key: "test-yt-key".to_string(),
                base_url: None,
                timeout_secs: 10,
            },
            pipeline: pipeline.clone(),
            moods: HashMap::new(),
        };

        let discovery = Arc::new(DiscoveryService::new(
            Arc::new(catalog.clone()),
            Arc::new(media.clone()),
            MoodTable::builtin(),
            pipeline,
        ));

        let state = Arc::new(vibescout_server::state::AppState::new(
            config,
            discovery,
            Arc::new(catalog.clone()),
        ));

        let router = vibescout_server::api::create_router(state);

        Self {
            router,
            catalog,
            media,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).to_string()))
        };

        TestResponse { status, body }
    }
}
