//! Mixed movie/series interleaving.

use crate::upstream::CatalogItem;

/// Build a mixed list of `target` items from two ranked lists.
///
/// Movies take `movie_share` of the target (rounded), series the rest; when
/// one side cannot fill its quota the other backfills. The output pattern is
/// `run` movies then one series, repeating until one side runs out, with the
/// remainder appended in rank order.
pub fn interleave_mixed(
    movies: Vec<CatalogItem>,
    series: Vec<CatalogItem>,
    target: usize,
    movie_share: f32,
    run: usize,
) -> Vec<CatalogItem> {
    let movie_quota = (target as f32 * movie_share).round() as usize;
    let series_quota = target.saturating_sub(movie_quota);

    let mut movie_take = movies.len().min(movie_quota);
    let mut series_take = series.len().min(series_quota);

    // Backfill whichever side has spare ranked items.
    if movie_take < movie_quota {
        series_take = series.len().min(target - movie_take);
    } else if series_take < series_quota {
        movie_take = movies.len().min(target - series_take);
    }

    let run = run.max(1);
    let mut out = Vec::with_capacity(movie_take + series_take);
    let mut movies = movies.into_iter().take(movie_take);
    let mut series = series.into_iter().take(series_take);

    loop {
        let mut pushed = false;
        for _ in 0..run {
            if let Some(movie) = movies.next() {
                out.push(movie);
                pushed = true;
            }
        }
        if let Some(show) = series.next() {
            out.push(show);
            pushed = true;
        }
        if !pushed {
            break;
        }
    }

    out
}
