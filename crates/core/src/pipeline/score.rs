//! Relevance scoring and ranking.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::upstream::{CatalogItem, ContentKind, MediaTrack};

/// Vote-count normalization thresholds. Series accumulate fewer votes than
/// movies for the same level of interest.
const MOVIE_VOTE_THRESHOLD: f32 = 200.0;
const SERIES_VOTE_THRESHOLD: f32 = 100.0;

/// Composite relevance score for a catalog item, bounded to roughly [0, 100]:
/// popularity up to 40, rating up to 30, vote volume up to 20, mood genre
/// overlap up to 10.
pub fn catalog_relevance(item: &CatalogItem, mood_genres: &[u32]) -> f32 {
    let popularity = (item.popularity / 10.0).min(40.0);
    let rating = (item.vote_average / 10.0) * 30.0;

    let vote_threshold = match item.kind {
        ContentKind::Movie => MOVIE_VOTE_THRESHOLD,
        ContentKind::Series => SERIES_VOTE_THRESHOLD,
    };
    let votes = (item.vote_count as f32 / vote_threshold * 20.0).min(20.0);

    let genre_overlap = if mood_genres.is_empty() {
        0.0
    } else {
        let matched = item
            .genre_ids
            .iter()
            .filter(|g| mood_genres.contains(g))
            .count();
        (matched as f32 / mood_genres.len() as f32) * 10.0
    };

    popularity + rating + votes + genre_overlap
}

/// Sort catalog items by relevance, highest first. The sort is stable, so
/// equally scored items keep their aggregation (strategy) order.
pub fn rank_catalog(items: &mut [CatalogItem], mood_genres: &[u32]) {
    items.sort_by(|a, b| {
        let score_a = catalog_relevance(a, mood_genres);
        let score_b = catalog_relevance(b, mood_genres);
        score_b.partial_cmp(&score_a).unwrap_or(std::cmp::Ordering::Equal)
    });
}

static OFFICIAL_CHANNEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)vevo|topic|official|records|music|entertainment").unwrap());
static OFFICIAL_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)official|audio|video|lyrics?").unwrap());

/// Integer quality score for a track. Official-looking channels and titles
/// dominate; view and like tiers add the rest.
pub fn track_quality_score(track: &MediaTrack) -> u32 {
    let mut score = 0;
    if OFFICIAL_CHANNEL.is_match(&track.channel) {
        score += 30;
    }
    if OFFICIAL_TITLE.is_match(&track.title) {
        score += 20;
    }
    if track.view_count > 100_000 {
        score += 15;
    }
    if track.view_count > 1_000_000 {
        score += 15;
    }
    if track.view_count > 10_000_000 {
        score += 10;
    }
    if track.like_count > 1_000 {
        score += 10;
    }
    score
}

/// Sort tracks by quality score, highest first, stable.
pub fn rank_tracks(tracks: &mut [MediaTrack]) {
    tracks.sort_by_key(|t| std::cmp::Reverse(track_quality_score(t)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: ContentKind, popularity: f32, vote_average: f32, vote_count: u32) -> CatalogItem {
        CatalogItem {
            id: 1,
            kind,
            title: "T".to_string(),
            overview: None,
            poster_path: None,
            release_date: None,
            genre_ids: vec![28, 12],
            popularity,
            vote_average,
            vote_count,
        }
    }

    #[test]
    fn test_relevance_is_bounded() {
        let maxed = item(ContentKind::Movie, 100_000.0, 10.0, 1_000_000);
        let score = catalog_relevance(&maxed, &[28, 12]);
        assert!(score <= 100.0);
        assert!((score - 100.0).abs() < 0.001);

        let empty = item(ContentKind::Movie, 0.0, 0.0, 0);
        assert_eq!(catalog_relevance(&empty, &[]), 0.0);
    }

    #[test]
    fn test_vote_threshold_differs_by_kind() {
        let movie = item(ContentKind::Movie, 0.0, 0.0, 100);
        let series = item(ContentKind::Series, 0.0, 0.0, 100);
        // 100 votes is half the movie threshold but the full series threshold.
        assert_eq!(catalog_relevance(&movie, &[]), 10.0);
        assert_eq!(catalog_relevance(&series, &[]), 20.0);
    }

    #[test]
    fn test_partial_genre_overlap() {
        let mut it = item(ContentKind::Movie, 0.0, 0.0, 0);
        it.genre_ids = vec![28];
        // 1 of 2 mood genres matched.
        assert_eq!(catalog_relevance(&it, &[28, 12]), 5.0);
    }

    #[test]
    fn test_rank_catalog_descending_and_stable() {
        let mut items = vec![
            item(ContentKind::Movie, 10.0, 5.0, 0),
            item(ContentKind::Movie, 500.0, 9.0, 10_000),
            item(ContentKind::Movie, 10.0, 5.0, 0),
        ];
        items[0].id = 1;
        items[1].id = 2;
        items[2].id = 3;

        rank_catalog(&mut items, &[]);
        let ids: Vec<u32> = items.iter().map(|i| i.id).collect();
        // Highest first; the two equal items keep their original order.
        assert_eq!(ids, vec![2, 1, 3]);
    }

    fn track(channel: &str, title: &str, views: u64, likes: u64) -> MediaTrack {
        MediaTrack {
            id: "x".to_string(),
            title: title.to_string(),
            channel: channel.to_string(),
            thumbnail: None,
            view_count: views,
            like_count: likes,
        }
    }

    #[test]
    fn test_track_score_tiers() {
        assert_eq!(track_quality_score(&track("Someone", "Plain", 0, 0)), 0);
        assert_eq!(
            track_quality_score(&track("ArtistVEVO", "Plain", 0, 0)),
            30
        );
        assert_eq!(
            track_quality_score(&track("Someone", "Song (Official Audio)", 0, 0)),
            20
        );
        // All view tiers stack: >100k, >1M, >10M.
        assert_eq!(
            track_quality_score(&track("Someone", "Plain", 20_000_000, 0)),
            40
        );
        assert_eq!(
            track_quality_score(&track("ArtistVEVO", "Song (Official Video)", 20_000_000, 5_000)),
            100
        );
    }

    #[test]
    fn test_rank_tracks_descending() {
        let mut tracks = vec![
            track("Someone", "Plain", 0, 0),
            track("ArtistVEVO", "Song (Official Audio)", 2_000_000, 5_000),
            track("Someone", "Song Audio", 200_000, 0),
        ];
        rank_tracks(&mut tracks);
        let scores: Vec<u32> = tracks.iter().map(track_quality_score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
}
