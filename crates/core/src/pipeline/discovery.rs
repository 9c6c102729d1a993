//! The discovery front door: strict pass, at most one relaxed pass, rank,
//! interleave. This is the only layer that knows about moods, floors and
//! degradation; everything below it just fetches, dedups and scores.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::aggregate::{aggregate_catalog, aggregate_media};
use super::filter::{CatalogFilter, MediaFilter};
use super::interleave::interleave_mixed;
use super::score::{rank_catalog, rank_tracks};
use crate::config::PipelineConfig;
use crate::moods::{MoodProfile, MoodTable};
use crate::upstream::{
    merge_stats, CatalogApi, CatalogItem, ContentKind, DiscoverFilters, FetchError,
    MediaSearchApi, MediaTrack,
};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The requested mood has no profile. Never silently substituted.
    #[error("Unknown mood: {0}")]
    UnknownMood(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Outcome of one discovery run. `met_floor` false is a normal state, not
/// an error; `superseded` true means a newer run started while this one was
/// in flight. Deciding what staleness means is the caller's job: an
/// interactive consumer discards superseded results, while the HTTP layer
/// serves every request independently and ignores the flag.
#[derive(Debug, Clone)]
pub struct DiscoveryOutcome<T> {
    pub items: Vec<T>,
    pub met_floor: bool,
    pub used_relaxed: bool,
    pub quota_exceeded: bool,
    pub superseded: bool,
}

/// Default search strategy ladder, most specific phrasing first.
pub fn strategy_ladder(query: &str) -> Vec<String> {
    vec![
        format!("{query} official audio topic"),
        format!("{query} official music video"),
        format!("{query} official lyric video"),
        format!("{query} official"),
        query.to_string(),
    ]
}

/// Extra strategies for the relaxed media pass, widened from the phrases
/// actually in play: the bare query by default, or the caller's override
/// phrasings when one was supplied.
fn relaxed_strategies(bases: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for base in bases {
        out.push(base.clone());
        out.push(format!("{base} song"));
        out.push(format!("{base} soundtrack"));
        out.push(format!("{base} ost"));
        out.push(format!("{base} official audio"));
    }
    out
}

struct KindResult {
    items: Vec<CatalogItem>,
    used_relaxed: bool,
    quota_exceeded: bool,
}

pub struct DiscoveryService {
    catalog: Arc<dyn CatalogApi>,
    media: Arc<dyn MediaSearchApi>,
    moods: MoodTable,
    config: PipelineConfig,
    /// Monotonic run counter; a run whose token is no longer current when it
    /// finishes lost to a later request.
    generation: AtomicU64,
}

impl DiscoveryService {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        media: Arc<dyn MediaSearchApi>,
        moods: MoodTable,
        config: PipelineConfig,
    ) -> Self {
        Self {
            catalog,
            media,
            moods,
            config,
            generation: AtomicU64::new(0),
        }
    }

    pub fn moods(&self) -> &MoodTable {
        &self.moods
    }

    pub fn resolve_mood(&self, name: &str) -> Result<&MoodProfile, DiscoveryError> {
        self.moods
            .resolve(name)
            .ok_or_else(|| DiscoveryError::UnknownMood(name.to_string()))
    }

    fn begin_run(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_superseded(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != token
    }

    /// Single-kind catalog discovery with optional degradation.
    pub async fn discover_catalog(
        &self,
        kind: ContentKind,
        filters: DiscoverFilters,
        pages: Option<u32>,
        target: usize,
        relax: bool,
    ) -> Result<DiscoveryOutcome<CatalogItem>, DiscoveryError> {
        let token = self.begin_run();
        let result = self.discover_kind(kind, filters, pages, target, relax).await?;
        let met_floor = result.items.len() >= self.config.catalog_floor;
        let mut items = result.items;
        items.truncate(target);
        Ok(DiscoveryOutcome {
            items,
            met_floor,
            used_relaxed: result.used_relaxed,
            quota_exceeded: result.quota_exceeded,
            superseded: self.is_superseded(token),
        })
    }

    /// Mood-driven mixed discovery: movies and series aggregated
    /// concurrently with separate seen-sets, ranked, then interleaved.
    pub async fn discover_mood(
        &self,
        mood: &str,
        target: usize,
        relax: bool,
    ) -> Result<DiscoveryOutcome<CatalogItem>, DiscoveryError> {
        let profile = self.resolve_mood(mood)?.clone();
        let token = self.begin_run();
        info!(mood = %profile.name, target, relax, "mood discovery");

        let filters = DiscoverFilters {
            genres: profile.genres.clone(),
            sort_by: Some("popularity.desc".to_string()),
            min_votes: Some(self.config.min_vote_count),
            ..Default::default()
        };

        let (movies, series) = tokio::join!(
            self.discover_kind(ContentKind::Movie, filters.clone(), None, target, relax),
            self.discover_kind(ContentKind::Series, filters.clone(), None, target, relax),
        );
        let movies = movies?;
        let series = series?;

        let met_floor = movies.items.len() + series.items.len() >= self.config.catalog_floor;
        let items = interleave_mixed(
            movies.items,
            series.items,
            target,
            self.config.movie_share,
            self.config.interleave_run,
        );

        Ok(DiscoveryOutcome {
            items,
            met_floor,
            used_relaxed: movies.used_relaxed || series.used_relaxed,
            quota_exceeded: movies.quota_exceeded || series.quota_exceeded,
            superseded: self.is_superseded(token),
        })
    }

    async fn discover_kind(
        &self,
        kind: ContentKind,
        filters: DiscoverFilters,
        pages: Option<u32>,
        target: usize,
        relax: bool,
    ) -> Result<KindResult, DiscoveryError> {
        let config = &self.config;
        let pages = pages
            .unwrap_or(config.default_pages)
            .clamp(1, config.max_pages);

        let mut seen: HashSet<u32> = HashSet::new();
        let mut raw: Vec<CatalogItem> = Vec::new();

        // Raw headroom: the filter will drop a share of what comes back.
        let raw_target = target.saturating_mul(2);
        let strict_outcome = aggregate_catalog(
            self.catalog.as_ref(),
            kind,
            &filters,
            pages,
            raw_target,
            config.fetch_concurrency,
            &mut seen,
            &mut raw,
        )
        .await?;

        let strict_filter = CatalogFilter::strict(config, &filters.genres);
        let mut filtered: Vec<CatalogItem> = raw
            .iter()
            .filter(|item| strict_filter.accepts(item))
            .cloned()
            .collect();

        let mut used_relaxed = false;
        let mut quota_exceeded = strict_outcome.quota_exceeded;

        if filtered.len() < config.catalog_floor && relax && !quota_exceeded {
            debug!(
                kind = %kind,
                strict_count = filtered.len(),
                floor = config.catalog_floor,
                "below floor, running relaxed pass"
            );
            used_relaxed = true;

            let mut relaxed_filters = filters.clone();
            relaxed_filters.min_votes = None;
            relaxed_filters.sort_by = Some("popularity.desc".to_string());
            relaxed_filters.year = filters.year.map(|y| y.widened(3));

            let merged_before = raw.len();
            let relaxed_outcome = aggregate_catalog(
                self.catalog.as_ref(),
                kind,
                &relaxed_filters,
                config.relaxed_pages,
                raw_target,
                config.fetch_concurrency,
                &mut seen,
                &mut raw,
            )
            .await?;
            quota_exceeded |= relaxed_outcome.quota_exceeded;

            let relaxed_filter = CatalogFilter::relaxed(config);
            // Strict rejects from the first pass get a second chance too.
            let already: HashSet<u32> = filtered.iter().map(|i| i.id).collect();
            filtered.extend(
                raw[..merged_before]
                    .iter()
                    .filter(|item| !already.contains(&item.id) && relaxed_filter.accepts(item))
                    .cloned(),
            );
            filtered.extend(
                raw[merged_before..]
                    .iter()
                    .filter(|item| relaxed_filter.accepts(item))
                    .cloned(),
            );
        }

        rank_catalog(&mut filtered, &filters.genres);

        Ok(KindResult {
            items: filtered,
            used_relaxed,
            quota_exceeded,
        })
    }

    /// Media search over a strategy ladder, with stats merge, filtering and
    /// ranking. The relaxed pass always runs when the floor is missed.
    pub async fn search_media(
        &self,
        query: &str,
        strategies: Option<Vec<String>>,
        limit: u32,
    ) -> Result<DiscoveryOutcome<MediaTrack>, DiscoveryError> {
        let token = self.begin_run();
        let config = &self.config;
        let limit = limit.clamp(1, config.max_search_results) as usize;
        // A caller override replaces the ladder and seeds the relaxed pass.
        let (strategies, relaxed_seeds) = match strategies {
            Some(list) => (list.clone(), list),
            None => (strategy_ladder(query), vec![query.to_string()]),
        };
        info!(query, strategies = strategies.len(), limit, "media search");

        let mut seen: HashSet<String> = HashSet::new();
        let mut raw: Vec<MediaTrack> = Vec::new();

        let per_strategy = (limit as u32).min(50);
        let outcome = aggregate_media(
            self.media.as_ref(),
            &strategies,
            per_strategy,
            limit * 2,
            &mut seen,
            &mut raw,
        )
        .await?;
        let mut quota_exceeded = outcome.quota_exceeded;

        quota_exceeded |= self.merge_track_stats(&mut raw, 0).await?;

        let strict_filter = MediaFilter::strict(config);
        let mut filtered: Vec<MediaTrack> = raw
            .iter()
            .filter(|t| strict_filter.accepts(t))
            .cloned()
            .collect();

        let mut used_relaxed = false;
        if filtered.len() < config.media_floor && !quota_exceeded {
            debug!(
                strict_count = filtered.len(),
                floor = config.media_floor,
                "below floor, running relaxed media pass"
            );
            used_relaxed = true;

            let merged_before = raw.len();
            let relaxed = aggregate_media(
                self.media.as_ref(),
                &relaxed_strategies(&relaxed_seeds),
                per_strategy,
                limit * 2,
                &mut seen,
                &mut raw,
            )
            .await?;
            quota_exceeded |= relaxed.quota_exceeded;
            quota_exceeded |= self.merge_track_stats(&mut raw, merged_before).await?;

            // Pattern exclusion only; engagement floors no longer apply,
            // including for first-pass rejects.
            let relaxed_filter = MediaFilter::relaxed();
            filtered = raw
                .iter()
                .filter(|t| relaxed_filter.accepts(t))
                .cloned()
                .collect();
        }

        rank_tracks(&mut filtered);
        let met_floor = filtered.len() >= config.media_floor;
        filtered.truncate(limit);

        Ok(DiscoveryOutcome {
            items: filtered,
            met_floor,
            used_relaxed,
            quota_exceeded,
            superseded: self.is_superseded(token),
        })
    }

    /// Merge engagement stats onto `tracks[from..]`. A stats quota trip is
    /// reported via the return value; other stats failures leave counters at
    /// zero and are only logged.
    async fn merge_track_stats(
        &self,
        tracks: &mut [MediaTrack],
        from: usize,
    ) -> Result<bool, DiscoveryError> {
        let ids: Vec<String> = tracks[from..].iter().map(|t| t.id.clone()).collect();
        if ids.is_empty() {
            return Ok(false);
        }
        match self.media.stats(&ids).await {
            Ok(stats) => {
                merge_stats(&mut tracks[from..], &stats);
                Ok(false)
            }
            Err(FetchError::QuotaExceeded) => {
                warn!("stats lookup hit quota, keeping zero counters");
                Ok(true)
            }
            Err(e @ FetchError::NotConfigured(_)) => Err(e.into()),
            Err(e) => {
                warn!(error = %e, "stats lookup failed, keeping zero counters");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCatalogApi, MockMediaSearchApi};
    use crate::upstream::TrackStats;

    fn good_item(id: u32, kind: ContentKind, genres: Vec<u32>) -> CatalogItem {
        CatalogItem {
            id,
            kind,
            title: format!("Item {id}"),
            overview: Some("A long enough overview for the filter.".to_string()),
            poster_path: Some("/p.jpg".to_string()),
            release_date: Some("2015-06-01".to_string()),
            genre_ids: genres,
            popularity: 50.0,
            vote_average: 7.0,
            vote_count: 500,
        }
    }

    fn weak_item(id: u32, kind: ContentKind) -> CatalogItem {
        CatalogItem {
            vote_count: 2,
            vote_average: 3.0,
            ..good_item(id, kind, vec![28])
        }
    }

    fn good_track(id: &str) -> MediaTrack {
        MediaTrack {
            id: id.to_string(),
            title: format!("Song {id} (Official Audio)"),
            channel: "ArtistVEVO".to_string(),
            thumbnail: None,
            view_count: 0,
            like_count: 0,
        }
    }

    fn service(catalog: MockCatalogApi, media: MockMediaSearchApi) -> DiscoveryService {
        let mut config = PipelineConfig::default();
        config.catalog_floor = 2;
        config.media_floor = 2;
        DiscoveryService::new(
            Arc::new(catalog),
            Arc::new(media),
            MoodTable::builtin(),
            config,
        )
    }

    #[tokio::test]
    async fn test_unknown_mood_is_fatal() {
        let svc = service(MockCatalogApi::new(), MockMediaSearchApi::new());
        let err = svc.discover_mood("bored", 10, false).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::UnknownMood(m) if m == "bored"));
    }

    #[tokio::test]
    async fn test_mood_discovery_interleaves_kinds() {
        let catalog = MockCatalogApi::new()
            .with_page(
                ContentKind::Movie,
                1,
                (0..10).map(|i| good_item(i, ContentKind::Movie, vec![28, 12])).collect(),
                1,
            )
            .with_page(
                ContentKind::Series,
                1,
                (100..110).map(|i| good_item(i, ContentKind::Series, vec![28])).collect(),
                1,
            );
        let svc = service(catalog, MockMediaSearchApi::new());

        let outcome = svc.discover_mood("action", 10, false).await.unwrap();
        assert_eq!(outcome.items.len(), 10);
        assert!(outcome.met_floor);
        assert!(!outcome.used_relaxed);
        assert_eq!(outcome.items[0].kind, ContentKind::Movie);
        assert_eq!(outcome.items[2].kind, ContentKind::Series);
        let movie_count = outcome
            .items
            .iter()
            .filter(|i| i.kind == ContentKind::Movie)
            .count();
        assert_eq!(movie_count, 6);
    }

    #[tokio::test]
    async fn test_relaxed_pass_runs_once_and_merges() {
        // Strict-quality page yields one item; floor is 2, so the relaxed
        // pass runs and admits the weak items without duplicating ids.
        let catalog = MockCatalogApi::new().with_page(
            ContentKind::Movie,
            1,
            vec![
                good_item(1, ContentKind::Movie, vec![28]),
                weak_item(2, ContentKind::Movie),
                weak_item(3, ContentKind::Movie),
            ],
            1,
        );
        let svc = service(catalog, MockMediaSearchApi::new());

        let outcome = svc
            .discover_catalog(
                ContentKind::Movie,
                DiscoverFilters {
                    genres: vec![28],
                    ..Default::default()
                },
                None,
                10,
                true,
            )
            .await
            .unwrap();

        assert!(outcome.used_relaxed);
        let mut ids: Vec<u32> = outcome.items.iter().map(|i| i.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_no_relaxed_pass_without_permission() {
        let catalog = MockCatalogApi::new().with_page(
            ContentKind::Movie,
            1,
            vec![weak_item(2, ContentKind::Movie)],
            1,
        );
        let svc = service(catalog, MockMediaSearchApi::new());

        let outcome = svc
            .discover_catalog(
                ContentKind::Movie,
                DiscoverFilters::default(),
                None,
                10,
                false,
            )
            .await
            .unwrap();

        assert!(!outcome.used_relaxed);
        assert!(!outcome.met_floor);
        assert!(outcome.items.is_empty());
    }

    #[tokio::test]
    async fn test_media_search_merges_stats_and_ranks() {
        let media = MockMediaSearchApi::new()
            .with_results("neon official audio topic", vec![good_track("a"), good_track("b")])
            .with_results("neon official music video", vec![good_track("c")])
            .with_stats("a", TrackStats { view_count: 2_000_000, like_count: 5_000 })
            .with_stats("b", TrackStats { view_count: 500_000, like_count: 100 })
            .with_stats("c", TrackStats { view_count: 6_000, like_count: 0 });
        let svc = service(MockCatalogApi::new(), media);

        let outcome = svc.search_media("neon", None, 20).await.unwrap();
        assert!(outcome.met_floor);
        assert!(!outcome.used_relaxed);
        assert_eq!(outcome.items[0].id, "a");
        assert_eq!(outcome.items[0].view_count, 2_000_000);
    }

    #[tokio::test]
    async fn test_media_quota_returns_partial_with_flag() {
        let media = MockMediaSearchApi::new()
            .with_results("neon official audio topic", vec![good_track("a")])
            .with_quota("neon official music video")
            .with_stats("a", TrackStats { view_count: 2_000_000, like_count: 5_000 });
        let svc = service(MockCatalogApi::new(), media);

        let outcome = svc.search_media("neon", None, 20).await.unwrap();
        assert!(outcome.quota_exceeded);
        // Quota suppresses the relaxed pass; partial results come back as-is.
        assert!(!outcome.used_relaxed);
        assert_eq!(outcome.items.len(), 1);
    }

    #[tokio::test]
    async fn test_media_relaxed_readmits_low_view_tracks() {
        let mut low = good_track("low");
        low.title = "Song low".to_string();
        low.channel = "Someone".to_string();
        let media = MockMediaSearchApi::new()
            .with_results("neon official audio topic", vec![low])
            .with_stats("low", TrackStats { view_count: 10, like_count: 0 });
        let svc = service(MockCatalogApi::new(), media);

        let outcome = svc.search_media("neon", None, 20).await.unwrap();
        assert!(outcome.used_relaxed);
        assert_eq!(outcome.items.len(), 1);
        assert!(!outcome.met_floor);
    }

    #[tokio::test]
    async fn test_caller_strategies_override_ladder() {
        let media = MockMediaSearchApi::new().with_results("exact phrase", vec![good_track("a")]);
        let svc = service(MockCatalogApi::new(), media.clone());

        svc.search_media("ignored", Some(vec!["exact phrase".to_string()]), 20)
            .await
            .unwrap();
        assert!(media
            .recorded_queries()
            .contains(&"exact phrase".to_string()));
    }

    #[tokio::test]
    async fn test_relaxed_pass_widens_caller_strategies() {
        // The one result is too weak for the strict filter, so the relaxed
        // pass runs; it must widen the caller's phrasing, not fall back to
        // the original query.
        let mut low = good_track("low");
        low.title = "Song low".to_string();
        low.channel = "Someone".to_string();
        let media = MockMediaSearchApi::new()
            .with_results("exact phrase", vec![low])
            .with_stats("low", TrackStats { view_count: 10, like_count: 0 });
        let svc = service(MockCatalogApi::new(), media.clone());

        let outcome = svc
            .search_media("ignored", Some(vec!["exact phrase".to_string()]), 20)
            .await
            .unwrap();
        assert!(outcome.used_relaxed);

        let recorded = media.recorded_queries();
        assert!(recorded.contains(&"exact phrase song".to_string()));
        assert!(!recorded.iter().any(|q| q.starts_with("ignored")));
    }

    #[tokio::test]
    async fn test_later_run_supersedes_earlier_token() {
        let catalog = MockCatalogApi::new().with_page(
            ContentKind::Movie,
            1,
            vec![good_item(1, ContentKind::Movie, vec![28])],
            1,
        );
        let svc = service(catalog, MockMediaSearchApi::new());

        let token = svc.begin_run();
        // Another request arrives before this run finishes.
        let _ = svc
            .discover_catalog(
                ContentKind::Movie,
                DiscoverFilters::default(),
                None,
                10,
                false,
            )
            .await
            .unwrap();
        assert!(svc.is_superseded(token));
    }

    #[test]
    fn test_strategy_ladder_order() {
        let ladder = strategy_ladder("neon dusk");
        assert_eq!(ladder[0], "neon dusk official audio topic");
        assert_eq!(ladder[4], "neon dusk");
    }
}
