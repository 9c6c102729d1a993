//! Multi-page / multi-strategy aggregation with first-occurrence dedup.
//!
//! Strategies run in priority order: discover pages in ascending page order,
//! search phrasings most-specific first. A running seen-set keeps the first
//! occurrence of every id and drops later ones, so earlier strategies always
//! win. Failed pages and strategies are logged and skipped; a quota trip
//! stops the source immediately and returns whatever was already collected.

use std::collections::HashSet;

use futures::StreamExt;
use tracing::{debug, warn};

use crate::upstream::{
    CatalogApi, CatalogItem, ContentKind, DiscoverFilters, FetchError, MediaSearchApi, MediaTrack,
};

/// How one aggregation run ended.
#[derive(Debug, Clone, Default)]
pub struct AggregationOutcome {
    /// The target unique count was reached before the budget ran out.
    pub target_reached: bool,
    /// The upstream tripped its quota; results are partial.
    pub quota_exceeded: bool,
    /// Pages or strategies that failed and were skipped.
    pub failed_units: Vec<String>,
}

/// Aggregate discover pages for one content kind.
///
/// New unique items are appended to `acc` and their ids recorded in `seen`,
/// so a later pass (the relaxed retry) can merge into the same set. Pages
/// are fetched concurrently up to `concurrency` but merged in page order.
/// Only `NotConfigured` escapes as an error.
pub async fn aggregate_catalog(
    api: &dyn CatalogApi,
    kind: ContentKind,
    filters: &DiscoverFilters,
    pages: u32,
    target: usize,
    concurrency: usize,
    seen: &mut HashSet<u32>,
    acc: &mut Vec<CatalogItem>,
) -> Result<AggregationOutcome, FetchError> {
    let mut outcome = AggregationOutcome::default();

    let mut stream = futures::stream::iter(1..=pages)
        .map(|page| api.discover(kind, filters, page))
        .buffered(concurrency.max(1));

    while let Some(result) = stream.next().await {
        match result {
            Ok(page) => {
                for item in page.items {
                    if seen.insert(item.id) {
                        acc.push(item);
                    }
                }
                debug!(kind = %kind, page = page.page, unique = acc.len(), "page merged");
                if acc.len() >= target {
                    outcome.target_reached = true;
                    break;
                }
                // No point queueing pages the upstream does not have.
                if page.total_pages > 0 && page.page >= page.total_pages {
                    break;
                }
            }
            Err(FetchError::QuotaExceeded) => {
                warn!(kind = %kind, "catalog quota exceeded, stopping with partial results");
                outcome.quota_exceeded = true;
                break;
            }
            Err(e @ FetchError::NotConfigured(_)) => return Err(e),
            Err(e) => {
                warn!(kind = %kind, error = %e, "page skipped");
                outcome.failed_units.push(e.to_string());
            }
        }
    }

    Ok(outcome)
}

/// Aggregate media search strategies in priority order.
///
/// Strategies run sequentially so that a hit on an early, more specific
/// phrasing short-circuits the vaguer ones. Dedup and merge semantics match
/// [`aggregate_catalog`].
pub async fn aggregate_media(
    api: &dyn MediaSearchApi,
    strategies: &[String],
    per_strategy: u32,
    target: usize,
    seen: &mut HashSet<String>,
    acc: &mut Vec<MediaTrack>,
) -> Result<AggregationOutcome, FetchError> {
    let mut outcome = AggregationOutcome::default();

    for strategy in strategies {
        if acc.len() >= target {
            outcome.target_reached = true;
            break;
        }

        match api.search(strategy, per_strategy).await {
            Ok(tracks) => {
                for track in tracks {
                    if seen.insert(track.id.clone()) {
                        acc.push(track);
                    }
                }
                debug!(strategy = %strategy, unique = acc.len(), "strategy merged");
            }
            Err(FetchError::QuotaExceeded) => {
                warn!(strategy = %strategy, "media quota exceeded, stopping with partial results");
                outcome.quota_exceeded = true;
                break;
            }
            Err(e @ FetchError::NotConfigured(_)) => return Err(e),
            Err(e) => {
                warn!(strategy = %strategy, error = %e, "strategy skipped");
                outcome.failed_units.push(e.to_string());
            }
        }
    }

    if acc.len() >= target {
        outcome.target_reached = true;
    }

    Ok(outcome)
}
