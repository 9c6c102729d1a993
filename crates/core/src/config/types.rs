use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub tmdb: TmdbConfig,
    pub youtube: YouTubeConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Additional or overriding mood profiles, keyed by mood name.
    #[serde(default)]
    pub moods: HashMap<String, MoodOverride>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Response cache configuration.
///
/// The in-process tier is always active. Setting `shared_path` adds a
/// SQLite-backed tier shared between processes on the same host.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Path for the shared SQLite cache. None = in-process cache only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_path: Option<PathBuf>,
    /// TTL for discover responses, which churn with upstream data.
    #[serde(default = "default_discover_ttl")]
    pub discover_ttl_secs: u64,
    /// TTL for media search and stats responses.
    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,
    /// TTL for item detail lookups.
    #[serde(default = "default_detail_ttl")]
    pub detail_ttl_secs: u64,
    /// TTL for watch-provider lookups, which change rarely.
    #[serde(default = "default_provider_ttl")]
    pub provider_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            shared_path: None,
            discover_ttl_secs: default_discover_ttl(),
            search_ttl_secs: default_search_ttl(),
            detail_ttl_secs: default_detail_ttl(),
            provider_ttl_secs: default_provider_ttl(),
        }
    }
}

fn default_discover_ttl() -> u64 {
    60 * 30
}

fn default_search_ttl() -> u64 {
    60 * 60
}

fn default_detail_ttl() -> u64 {
    60 * 60
}

fn default_provider_ttl() -> u64 {
    60 * 60 * 24
}

/// Catalog (TMDB) API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// TMDB API key (required).
    pub api_key: String,
    /// Base URL override, mainly for tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Per-request timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Media search (YouTube Data API) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YouTubeConfig {
    /// YouTube Data API key (required).
    pub api_key: String,
    /// Base URL override, mainly for tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Per-request timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    10
}

/// Tunable knobs for aggregation, filtering and ranking.
///
/// The engagement and score cutoffs were tuned against real traffic;
/// they are configuration, not invariants.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Minimum acceptable unique catalog items after filtering.
    #[serde(default = "default_catalog_floor")]
    pub catalog_floor: usize,
    /// Minimum acceptable unique tracks after filtering.
    #[serde(default = "default_media_floor")]
    pub media_floor: usize,
    /// Default number of discover pages per aggregation.
    #[serde(default = "default_pages")]
    pub default_pages: u32,
    /// Hard cap on discover pages per aggregation.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Page budget for the relaxed pass.
    #[serde(default = "default_relaxed_pages")]
    pub relaxed_pages: u32,
    /// Concurrent in-flight page fetches per content kind.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    /// Strict-mode vote count floor for catalog items.
    #[serde(default = "default_min_vote_count")]
    pub min_vote_count: u32,
    /// Strict-mode vote average floor for catalog items.
    #[serde(default = "default_min_vote_average")]
    pub min_vote_average: f32,
    /// Oldest acceptable release year.
    #[serde(default = "default_min_release_year")]
    pub min_release_year: i32,
    /// Minimum trimmed overview length.
    #[serde(default = "default_min_overview_len")]
    pub min_overview_len: usize,
    /// Minimum view count for tracks.
    #[serde(default = "default_min_track_views")]
    pub min_track_views: u64,
    /// Minimum composite quality score for tracks.
    #[serde(default = "default_min_track_score")]
    pub min_track_score: u32,
    /// Share of a mixed result set taken from movies; the rest is series.
    #[serde(default = "default_movie_share")]
    pub movie_share: f32,
    /// Movies emitted per series slot when interleaving mixed results.
    #[serde(default = "default_interleave_run")]
    pub interleave_run: usize,
    /// Cap on aggregated media search results per request.
    #[serde(default = "default_max_search_results")]
    pub max_search_results: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            catalog_floor: default_catalog_floor(),
            media_floor: default_media_floor(),
            default_pages: default_pages(),
            max_pages: default_max_pages(),
            relaxed_pages: default_relaxed_pages(),
            fetch_concurrency: default_fetch_concurrency(),
            min_vote_count: default_min_vote_count(),
            min_vote_average: default_min_vote_average(),
            min_release_year: default_min_release_year(),
            min_overview_len: default_min_overview_len(),
            min_track_views: default_min_track_views(),
            min_track_score: default_min_track_score(),
            movie_share: default_movie_share(),
            interleave_run: default_interleave_run(),
            max_search_results: default_max_search_results(),
        }
    }
}

fn default_catalog_floor() -> usize {
    20
}

fn default_media_floor() -> usize {
    15
}

fn default_pages() -> u32 {
    10
}

fn default_max_pages() -> u32 {
    20
}

fn default_relaxed_pages() -> u32 {
    20
}

fn default_fetch_concurrency() -> usize {
    4
}

fn default_min_vote_count() -> u32 {
    20
}

fn default_min_vote_average() -> f32 {
    4.0
}

fn default_min_release_year() -> i32 {
    1960
}

fn default_min_overview_len() -> usize {
    10
}

fn default_min_track_views() -> u64 {
    5000
}

fn default_min_track_score() -> u32 {
    15
}

fn default_movie_share() -> f32 {
    0.6
}

fn default_interleave_run() -> usize {
    2
}

fn default_max_search_results() -> u32 {
    50
}

/// A mood profile supplied (or overridden) via `[moods.<name>]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoodOverride {
    /// Catalog genre ids this mood maps to.
    pub genres: Vec<u32>,
    /// Free-text keywords seeding the music search.
    pub keywords: String,
    /// Optional display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub tmdb: SanitizedUpstreamConfig,
    pub youtube: SanitizedUpstreamConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedUpstreamConfig {
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            cache: config.cache.clone(),
            tmdb: SanitizedUpstreamConfig {
                api_key_configured: !config.tmdb.api_key.is_empty(),
                base_url: config.tmdb.base_url.clone(),
                timeout_secs: config.tmdb.timeout_secs,
            },
            youtube: SanitizedUpstreamConfig {
                api_key_configured: !config.youtube.api_key.is_empty(),
                base_url: config.youtube.base_url.clone(),
                timeout_secs: config.youtube.timeout_secs,
            },
            pipeline: config.pipeline.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> Config {
        Config {
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            tmdb: TmdbConfig {
                api_key: "tmdb-key".to_string(),
                base_url: None,
                timeout_secs: default_timeout(),
            },
            youtube: YouTubeConfig {
                api_key: "yt-key".to_string(),
                base_url: None,
                timeout_secs: default_timeout(),
            },
            pipeline: PipelineConfig::default(),
            moods: HashMap::new(),
        }
    }

    #[test]
    fn test_pipeline_defaults() {
        let p = PipelineConfig::default();
        assert_eq!(p.catalog_floor, 20);
        assert_eq!(p.media_floor, 15);
        assert_eq!(p.min_track_views, 5000);
        assert_eq!(p.min_track_score, 15);
        assert!((p.movie_share - 0.6).abs() < f32::EPSILON);
        assert_eq!(p.interleave_run, 2);
    }

    #[test]
    fn test_sanitized_config_redacts_keys() {
        let config = minimal_config();
        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_string(&sanitized).unwrap();

        assert!(!json.contains("tmdb-key"));
        assert!(!json.contains("yt-key"));
        assert!(json.contains("api_key_configured"));
    }
}
