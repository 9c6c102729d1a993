//! Quality filters for catalog items and media tracks.
//!
//! Each filter is an AND of independent predicates. Thresholds come from
//! [`PipelineConfig`]; the relaxed variants drop the engagement floors but
//! keep the structural checks (and, for tracks, the exclusion patterns).

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::config::PipelineConfig;
use crate::pipeline::score::track_quality_score;
use crate::upstream::{CatalogItem, MediaTrack};

/// Catalog item filter.
#[derive(Debug, Clone)]
pub struct CatalogFilter {
    min_vote_count: u32,
    min_vote_average: f32,
    min_release_year: i32,
    min_overview_len: usize,
    /// Genre ids the item must overlap with; empty disables the check.
    mood_genres: Vec<u32>,
}

impl CatalogFilter {
    /// Full predicate set.
    pub fn strict(config: &PipelineConfig, mood_genres: &[u32]) -> Self {
        Self {
            min_vote_count: config.min_vote_count,
            min_vote_average: config.min_vote_average,
            min_release_year: config.min_release_year,
            min_overview_len: config.min_overview_len,
            mood_genres: mood_genres.to_vec(),
        }
    }

    /// Engagement floors at zero, no genre requirement. Structural checks
    /// (poster, title, overview, release year) still apply.
    pub fn relaxed(config: &PipelineConfig) -> Self {
        Self {
            min_vote_count: 0,
            min_vote_average: 0.0,
            min_release_year: config.min_release_year,
            min_overview_len: config.min_overview_len,
            mood_genres: Vec::new(),
        }
    }

    pub fn accepts(&self, item: &CatalogItem) -> bool {
        if item.vote_count < self.min_vote_count {
            return false;
        }
        if item.vote_average < self.min_vote_average {
            return false;
        }
        if item.poster_path.is_none() {
            return false;
        }
        if item.title.trim().is_empty() {
            return false;
        }
        match &item.overview {
            Some(overview) if overview.trim().len() > self.min_overview_len => {}
            _ => return false,
        }
        // Items without a date pass; only a known-old year disqualifies.
        if let Some(year) = item.year() {
            if year < self.min_release_year {
                return false;
            }
        }
        if !self.mood_genres.is_empty()
            && !item.genre_ids.iter().any(|g| self.mood_genres.contains(g))
        {
            return false;
        }
        true
    }

    /// Filter in place, preserving order.
    pub fn apply(&self, items: &mut Vec<CatalogItem>) {
        items.retain(|item| self.accepts(item));
    }
}

/// Titles and channels matching any of these are compilations, mixes or
/// other non-single-track uploads.
static EXCLUSION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)jukebox",
        r"(?i)playlist",
        r"(?i)compilation",
        r"(?i)\bhits?\b",
        r"(?i)best of",
        r"(?i)top \d+",
        r"(?i)greatest",
        r"(?i)collection",
        r"(?i)\bmix\b",
        r"(?i)mashup",
        r"(?i)medley",
        r"(?i)\d{4}'?s",
        r"(?i)throwback",
        r"(?i)oldies",
        r"(?i)non.?stop",
        r"(?i)\b\d+\s*hours?\b",
        r"(?i)\b\d+\s*min(ute)?s?\b",
        r"(?i)full album",
        r"(?i)\bep\b",
        r"(?i)\blp\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// "classic(s)" flags a compilation, except in the phrase "classic movie".
// regex-lite has no lookahead, so the exemption is a second match.
static CLASSIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bclassics?\b").unwrap());
static CLASSIC_MOVIE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bclassics?\s+movie\b").unwrap());

fn has_exclusion_marker(text: &str) -> bool {
    if EXCLUSION_PATTERNS.iter().any(|p| p.is_match(text)) {
        return true;
    }
    CLASSIC.is_match(text) && !CLASSIC_MOVIE.is_match(text)
}

/// True if the track looks like a compilation or mix upload.
pub fn is_excluded(track: &MediaTrack) -> bool {
    has_exclusion_marker(&track.title) || has_exclusion_marker(&track.channel)
}

/// Media track filter.
#[derive(Debug, Clone)]
pub struct MediaFilter {
    min_views: u64,
    min_score: u32,
}

impl MediaFilter {
    pub fn strict(config: &PipelineConfig) -> Self {
        Self {
            min_views: config.min_track_views,
            min_score: config.min_track_score,
        }
    }

    /// Exclusion patterns only; no engagement floors.
    pub fn relaxed() -> Self {
        Self {
            min_views: 0,
            min_score: 0,
        }
    }

    pub fn accepts(&self, track: &MediaTrack) -> bool {
        if is_excluded(track) {
            return false;
        }
        if track.view_count < self.min_views {
            return false;
        }
        track_quality_score(track) >= self.min_score
    }

    pub fn apply(&self, tracks: &mut Vec<MediaTrack>) {
        tracks.retain(|track| self.accepts(track));
    }
}
