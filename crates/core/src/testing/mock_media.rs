//! Mock media search fetcher for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::upstream::{FetchError, MediaSearchApi, MediaTrack, TrackStats};

#[derive(Clone)]
enum QueryBehavior {
    Results(Vec<MediaTrack>),
    Fail,
    Quota,
}

/// Mock implementation of the [`MediaSearchApi`] trait.
///
/// Behavior is keyed by exact query string; unconfigured queries return no
/// results. Stats are served from a fixed id map. Queries are recorded for
/// assertions.
#[derive(Clone, Default)]
pub struct MockMediaSearchApi {
    queries: Arc<Mutex<HashMap<String, QueryBehavior>>>,
    stats: Arc<Mutex<HashMap<String, TrackStats>>>,
    stats_quota: Arc<Mutex<bool>>,
    recorded: Arc<Mutex<Vec<String>>>,
}

impl MockMediaSearchApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure results for one query.
    pub fn with_results(self, query: &str, tracks: Vec<MediaTrack>) -> Self {
        self.queries
            .lock()
            .unwrap()
            .insert(query.to_string(), QueryBehavior::Results(tracks));
        self
    }

    /// Make one query fail with `StrategyFailed`.
    pub fn with_failure(self, query: &str) -> Self {
        self.queries
            .lock()
            .unwrap()
            .insert(query.to_string(), QueryBehavior::Fail);
        self
    }

    /// Make one query trip the quota.
    pub fn with_quota(self, query: &str) -> Self {
        self.queries
            .lock()
            .unwrap()
            .insert(query.to_string(), QueryBehavior::Quota);
        self
    }

    /// Configure stats for one track id.
    pub fn with_stats(self, id: &str, stats: TrackStats) -> Self {
        self.stats.lock().unwrap().insert(id.to_string(), stats);
        self
    }

    /// Make every stats lookup trip the quota.
    pub fn with_stats_quota(self) -> Self {
        *self.stats_quota.lock().unwrap() = true;
        self
    }

    /// Search queries made so far, in order.
    pub fn recorded_queries(&self) -> Vec<String> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaSearchApi for MockMediaSearchApi {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<MediaTrack>, FetchError> {
        self.recorded.lock().unwrap().push(query.to_string());

        let behavior = self.queries.lock().unwrap().get(query).cloned();
        match behavior {
            Some(QueryBehavior::Results(tracks)) => {
                Ok(tracks.into_iter().take(max_results as usize).collect())
            }
            Some(QueryBehavior::Fail) => Err(FetchError::StrategyFailed {
                strategy: query.to_string(),
                message: "mock strategy failure".to_string(),
            }),
            Some(QueryBehavior::Quota) => Err(FetchError::QuotaExceeded),
            None => Ok(vec![]),
        }
    }

    async fn stats(&self, ids: &[String]) -> Result<HashMap<String, TrackStats>, FetchError> {
        if *self.stats_quota.lock().unwrap() {
            return Err(FetchError::QuotaExceeded);
        }
        let stats = self.stats.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| stats.get(id).map(|s| (id.clone(), *s)))
            .collect())
    }
}
