//! TMDB (The Movie Database) discover client.
//!
//! All calls go through the response cache; the API key is sent on the wire
//! but never enters cache signatures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::types::{CatalogApi, CatalogItem, CatalogPage, ContentKind, DiscoverFilters, FetchError};
use crate::cache::{RequestSignature, ResponseCache};
use crate::config::{CacheConfig, TmdbConfig};

/// TMDB-backed catalog fetcher.
pub struct TmdbCatalog {
    client: Client,
    base_url: String,
    api_key: String,
    cache: Arc<dyn ResponseCache>,
    discover_ttl: Duration,
    detail_ttl: Duration,
    provider_ttl: Duration,
}

fn kind_path(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Movie => "movie",
        ContentKind::Series => "tv",
    }
}

impl TmdbCatalog {
    pub fn new(
        config: &TmdbConfig,
        cache_config: &CacheConfig,
        cache: Arc<dyn ResponseCache>,
    ) -> Result<Self, FetchError> {
        if config.api_key.is_empty() {
            return Err(FetchError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| FetchError::NotConfigured(e.to_string()))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            cache,
            discover_ttl: Duration::from_secs(cache_config.discover_ttl_secs),
            detail_ttl: Duration::from_secs(cache_config.detail_ttl_secs),
            provider_ttl: Duration::from_secs(cache_config.provider_ttl_secs),
        })
    }

    /// Fetch a JSON document, mapping failures to `Api`/`Parse` errors.
    async fn get_json(
        &self,
        url: &str,
        signature: &RequestSignature,
        ttl: Duration,
    ) -> Result<serde_json::Value, FetchError> {
        if let Some(body) = self.cache.get(signature).await {
            if let Ok(value) = serde_json::from_str(&body) {
                return Ok(value);
            }
        }

        let response = self
            .client
            .get(url)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await
            .map_err(|e| FetchError::Api {
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == 401 {
            return Err(FetchError::NotConfigured(
                "Invalid TMDB API key".to_string(),
            ));
        }
        if status == 429 {
            return Err(FetchError::QuotaExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        self.cache.set(signature, body, ttl).await;
        Ok(value)
    }
}

#[async_trait]
impl CatalogApi for TmdbCatalog {
    async fn discover(
        &self,
        kind: ContentKind,
        filters: &DiscoverFilters,
        page: u32,
    ) -> Result<CatalogPage, FetchError> {
        let path = kind_path(kind);
        let params = filters.query_params(kind, page);
        let signature = RequestSignature::new(&format!("tmdb/discover/{path}"), params.clone());

        if let Some(body) = self.cache.get(&signature).await {
            if let Ok(cached) = serde_json::from_str::<CatalogPage>(&body) {
                return Ok(cached);
            }
        }

        let url = format!("{}/discover/{}", self.base_url, path);
        debug!(kind = %kind, page, "TMDB discover");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await
            .map_err(|e| classify_page_error(page, e))?;

        let status = response.status();
        if status == 401 {
            return Err(FetchError::NotConfigured(
                "Invalid TMDB API key".to_string(),
            ));
        }
        if status == 429 {
            return Err(FetchError::QuotaExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::PageFailed {
                page,
                message: format!("status {}: {}", status.as_u16(), body),
            });
        }

        let raw: DiscoverResponse = response.json().await.map_err(|e| FetchError::PageFailed {
            page,
            message: format!("failed to parse discover response: {e}"),
        })?;

        let catalog_page = raw.into_page(kind);
        if let Ok(body) = serde_json::to_string(&catalog_page) {
            self.cache.set(&signature, body, self.discover_ttl).await;
        }
        Ok(catalog_page)
    }

    async fn detail(&self, kind: ContentKind, id: u32) -> Result<serde_json::Value, FetchError> {
        let path = kind_path(kind);
        let url = format!("{}/{}/{}", self.base_url, path, id);
        let signature = RequestSignature::new(
            &format!("tmdb/detail/{path}"),
            [("id".to_string(), id.to_string())],
        );
        debug!(kind = %kind, id, "TMDB detail");
        self.get_json(&url, &signature, self.detail_ttl).await
    }

    async fn watch_providers(
        &self,
        kind: ContentKind,
        id: u32,
    ) -> Result<serde_json::Value, FetchError> {
        let path = kind_path(kind);
        let url = format!("{}/{}/{}/watch/providers", self.base_url, path, id);
        let signature = RequestSignature::new(
            &format!("tmdb/providers/{path}"),
            [("id".to_string(), id.to_string())],
        );
        debug!(kind = %kind, id, "TMDB watch providers");
        self.get_json(&url, &signature, self.provider_ttl).await
    }
}

/// Timeouts and connection failures are page-local problems.
fn classify_page_error(page: u32, e: reqwest::Error) -> FetchError {
    let message = if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    };
    FetchError::PageFailed { page, message }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    page: u32,
    #[serde(default)]
    total_pages: u32,
    results: Vec<DiscoverResult>,
}

/// Movies carry `title`/`release_date`; series carry `name`/`first_air_date`.
#[derive(Debug, Deserialize)]
struct DiscoverResult {
    id: u32,
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    popularity: Option<f32>,
    vote_average: Option<f32>,
    vote_count: Option<u32>,
}

impl DiscoverResponse {
    fn into_page(self, kind: ContentKind) -> CatalogPage {
        CatalogPage {
            page: self.page,
            total_pages: self.total_pages,
            items: self.results.into_iter().map(|r| r.into_item(kind)).collect(),
        }
    }
}

impl DiscoverResult {
    fn into_item(self, kind: ContentKind) -> CatalogItem {
        let title = match kind {
            ContentKind::Movie => self.title,
            ContentKind::Series => self.name,
        }
        .unwrap_or_default();
        let release_date = match kind {
            ContentKind::Movie => self.release_date,
            ContentKind::Series => self.first_air_date,
        }
        .filter(|d| !d.is_empty());

        CatalogItem {
            id: self.id,
            kind,
            title,
            overview: self.overview,
            poster_path: self.poster_path,
            release_date,
            genre_ids: self.genre_ids,
            popularity: self.popularity.unwrap_or(0.0),
            vote_average: self.vote_average.unwrap_or(0.0),
            vote_count: self.vote_count.unwrap_or(0),
        }
    }
}
