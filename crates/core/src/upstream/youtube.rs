//! YouTube Data API media search client.
//!
//! Search returns track stubs; engagement counters come from the batch
//! `videos` stats endpoint and are merged onto the stubs by id. The API
//! reports counters as JSON strings, parsed here with a zero default.
//! HTTP 403 means the daily quota is gone and maps to `QuotaExceeded`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::types::{FetchError, MediaSearchApi, MediaTrack, TrackStats};
use crate::cache::{RequestSignature, ResponseCache};
use crate::config::{CacheConfig, YouTubeConfig};

/// Batch size limit imposed by the videos endpoint.
const STATS_BATCH_SIZE: usize = 50;

/// YouTube-backed media search fetcher.
pub struct YouTubeMediaSearch {
    client: Client,
    base_url: String,
    api_key: String,
    cache: Arc<dyn ResponseCache>,
    search_ttl: Duration,
}

impl YouTubeMediaSearch {
    pub fn new(
        config: &YouTubeConfig,
        cache_config: &CacheConfig,
        cache: Arc<dyn ResponseCache>,
    ) -> Result<Self, FetchError> {
        if config.api_key.is_empty() {
            return Err(FetchError::NotConfigured(
                "YouTube API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| FetchError::NotConfigured(e.to_string()))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://www.googleapis.com/youtube/v3".to_string());

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            cache,
            search_ttl: Duration::from_secs(cache_config.search_ttl_secs),
        })
    }

    async fn stats_batch(&self, ids: &[String]) -> Result<HashMap<String, TrackStats>, FetchError> {
        let joined = ids.join(",");
        let signature = RequestSignature::new("youtube/stats", [("ids", joined.as_str())]);

        if let Some(body) = self.cache.get(&signature).await {
            if let Ok(cached) = serde_json::from_str(&body) {
                return Ok(cached);
            }
        }

        let url = format!("{}/videos", self.base_url);
        debug!(count = ids.len(), "YouTube stats lookup");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "statistics"),
                ("id", joined.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::StrategyFailed {
                strategy: "stats".to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == 403 {
            return Err(FetchError::QuotaExceeded);
        }
        if status == 400 || status == 401 {
            return Err(FetchError::NotConfigured(
                "YouTube API key rejected".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::StrategyFailed {
                strategy: "stats".to_string(),
                message: format!("status {}: {}", status.as_u16(), body),
            });
        }

        let raw: StatsResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(format!("failed to parse stats response: {e}")))?;

        let stats: HashMap<String, TrackStats> = raw
            .items
            .into_iter()
            .map(|item| (item.id, item.statistics.into()))
            .collect();

        if let Ok(body) = serde_json::to_string(&stats) {
            self.cache.set(&signature, body, self.search_ttl).await;
        }
        Ok(stats)
    }
}

#[async_trait]
impl MediaSearchApi for YouTubeMediaSearch {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<MediaTrack>, FetchError> {
        let signature = RequestSignature::new(
            "youtube/search",
            [
                ("q".to_string(), query.to_string()),
                ("max_results".to_string(), max_results.to_string()),
            ],
        );

        if let Some(body) = self.cache.get(&signature).await {
            if let Ok(cached) = serde_json::from_str(&body) {
                return Ok(cached);
            }
        }

        let url = format!("{}/search", self.base_url);
        debug!(query, max_results, "YouTube search");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("videoCategoryId", "10"),
                ("maxResults", &max_results.to_string()),
                ("q", query),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::StrategyFailed {
                strategy: query.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == 403 {
            return Err(FetchError::QuotaExceeded);
        }
        if status == 400 || status == 401 {
            return Err(FetchError::NotConfigured(
                "YouTube API key rejected".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::StrategyFailed {
                strategy: query.to_string(),
                message: format!("status {}: {}", status.as_u16(), body),
            });
        }

        let raw: SearchResponse = response.json().await.map_err(|e| {
            FetchError::StrategyFailed {
                strategy: query.to_string(),
                message: format!("failed to parse search response: {e}"),
            }
        })?;

        let tracks: Vec<MediaTrack> = raw
            .items
            .into_iter()
            .filter_map(|item| item.into_track())
            .collect();

        if let Ok(body) = serde_json::to_string(&tracks) {
            self.cache.set(&signature, body, self.search_ttl).await;
        }
        Ok(tracks)
    }

    async fn stats(&self, ids: &[String]) -> Result<HashMap<String, TrackStats>, FetchError> {
        let mut all = HashMap::new();
        for chunk in ids.chunks(STATS_BATCH_SIZE) {
            all.extend(self.stats_batch(chunk).await?);
        }
        Ok(all)
    }
}

// ============================================================================
// YouTube API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(rename = "channelTitle")]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl SearchItem {
    /// Non-video results (channels, playlists) have no video id and are dropped.
    fn into_track(self) -> Option<MediaTrack> {
        Some(MediaTrack {
            id: self.id.video_id?,
            title: self.snippet.title,
            channel: self.snippet.channel_title,
            thumbnail: self.snippet.thumbnails.medium.map(|t| t.url),
            view_count: 0,
            like_count: 0,
        })
    }
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    items: Vec<StatsItem>,
}

#[derive(Debug, Deserialize)]
struct StatsItem {
    id: String,
    statistics: Statistics,
}

/// Counters arrive as strings and may be withheld entirely.
#[derive(Debug, Deserialize)]
struct Statistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
}

impl From<Statistics> for TrackStats {
    fn from(s: Statistics) -> Self {
        Self {
            view_count: s.view_count.and_then(|v| v.parse().ok()).unwrap_or(0),
            like_count: s.like_count.and_then(|v| v.parse().ok()).unwrap_or(0),
        }
    }
}
