//! Types shared by the upstream fetchers.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content kind, decided once when an item enters the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Series,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Movie => write!(f, "movie"),
            ContentKind::Series => write!(f, "series"),
        }
    }
}

/// One item from the catalog upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// Upstream catalog id (unique per kind).
    pub id: u32,
    pub kind: ContentKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Poster path, relative to the upstream image base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// Release date (movies) or first air date (series), YYYY-MM-DD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub popularity: f32,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: u32,
}

impl CatalogItem {
    /// Release year parsed from the date, if any.
    pub fn year(&self) -> Option<i32> {
        self.release_date
            .as_ref()
            .and_then(|d| d.split('-').next())
            .and_then(|y| y.parse().ok())
    }
}

/// One page of discover results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPage {
    pub page: u32,
    pub total_pages: u32,
    pub items: Vec<CatalogItem>,
}

/// Year constraint for discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearFilter {
    Exact(i32),
    Range { from: i32, to: i32 },
}

impl YearFilter {
    /// Widen an exact year into a range of ±`by` years. Ranges stay as-is.
    pub fn widened(&self, by: i32) -> YearFilter {
        match *self {
            YearFilter::Exact(year) => YearFilter::Range {
                from: year - by,
                to: year + by,
            },
            range @ YearFilter::Range { .. } => range,
        }
    }
}

/// Discovery filter set. Known fields are structured; anything else the
/// caller sends rides along in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverFilters {
    pub genres: Vec<u32>,
    pub year: Option<YearFilter>,
    pub sort_by: Option<String>,
    pub min_votes: Option<u32>,
    pub extra: BTreeMap<String, String>,
}

impl DiscoverFilters {
    /// Render the filter set as upstream query parameters for one page.
    /// The output is deterministic, so it doubles as cache signature input.
    pub fn query_params(&self, kind: ContentKind, page: u32) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = Vec::new();

        if !self.genres.is_empty() {
            let genres = self
                .genres
                .iter()
                .map(|g| g.to_string())
                .collect::<Vec<_>>()
                .join(",");
            params.push(("with_genres".to_string(), genres));
        }

        match (kind, self.year) {
            (ContentKind::Movie, Some(YearFilter::Exact(y))) => {
                params.push(("primary_release_year".to_string(), y.to_string()));
            }
            (ContentKind::Movie, Some(YearFilter::Range { from, to })) => {
                params.push((
                    "primary_release_date.gte".to_string(),
                    format!("{from}-01-01"),
                ));
                params.push((
                    "primary_release_date.lte".to_string(),
                    format!("{to}-12-31"),
                ));
            }
            (ContentKind::Series, Some(YearFilter::Exact(y))) => {
                params.push(("first_air_date_year".to_string(), y.to_string()));
            }
            (ContentKind::Series, Some(YearFilter::Range { from, to })) => {
                params.push(("first_air_date.gte".to_string(), format!("{from}-01-01")));
                params.push(("first_air_date.lte".to_string(), format!("{to}-12-31")));
            }
            (_, None) => {}
        }

        if let Some(sort_by) = &self.sort_by {
            params.push(("sort_by".to_string(), sort_by.clone()));
        }
        if let Some(min_votes) = self.min_votes {
            params.push(("vote_count.gte".to_string(), min_votes.to_string()));
        }

        for (k, v) in &self.extra {
            params.push((k.clone(), v.clone()));
        }

        params.push(("page".to_string(), page.to_string()));
        params
    }
}

/// One track stub from the media search upstream. View and like counts are
/// zero until stats are merged in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaTrack {
    pub id: String,
    pub title: String,
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
}

/// Engagement counters from the batch stats lookup.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TrackStats {
    pub view_count: u64,
    pub like_count: u64,
}

/// Merge stats onto track stubs by id. Tracks without stats keep zero counts.
pub fn merge_stats(tracks: &mut [MediaTrack], stats: &HashMap<String, TrackStats>) {
    for track in tracks {
        if let Some(s) = stats.get(&track.id) {
            track.view_count = s.view_count;
            track.like_count = s.like_count;
        }
    }
}

/// Errors crossing the fetcher boundary. Raw transport errors never leave
/// the fetchers; they are classified here first.
#[derive(Debug, Error)]
pub enum FetchError {
    /// One discover page failed. Recoverable: the aggregator skips it.
    #[error("Page {page} fetch failed: {message}")]
    PageFailed { page: u32, message: String },

    /// One search strategy failed. Recoverable: the aggregator skips it.
    #[error("Strategy '{strategy}' failed: {message}")]
    StrategyFailed { strategy: String, message: String },

    /// The upstream refused for quota reasons. The aggregation halts for
    /// this source and returns whatever it already has.
    #[error("Upstream quota exceeded")]
    QuotaExceeded,

    /// Missing or rejected credentials.
    #[error("Upstream not configured: {0}")]
    NotConfigured(String),

    /// Non-page upstream failure (detail/provider lookups).
    #[error("Upstream API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse upstream response: {0}")]
    Parse(String),
}

/// Paginated catalog upstream (discover plus passthrough lookups).
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one discover page for the given filter set.
    async fn discover(
        &self,
        kind: ContentKind,
        filters: &DiscoverFilters,
        page: u32,
    ) -> Result<CatalogPage, FetchError>;

    /// Item detail lookup, passed through unmodified.
    async fn detail(&self, kind: ContentKind, id: u32) -> Result<serde_json::Value, FetchError>;

    /// Watch-provider lookup, passed through unmodified.
    async fn watch_providers(
        &self,
        kind: ContentKind,
        id: u32,
    ) -> Result<serde_json::Value, FetchError>;
}

/// Free-text media search upstream.
#[async_trait]
pub trait MediaSearchApi: Send + Sync {
    /// Run one search query, returning track stubs in upstream order.
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<MediaTrack>, FetchError>;

    /// Batch stats lookup. At most 50 ids per call; callers chunk.
    async fn stats(&self, ids: &[String]) -> Result<HashMap<String, TrackStats>, FetchError>;
}
