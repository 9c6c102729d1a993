//! The discovery pipeline: aggregation, filtering, scoring, interleaving
//! and the degradation-aware front door.

mod aggregate;
mod discovery;
mod filter;
mod interleave;
mod score;

pub use aggregate::{aggregate_catalog, aggregate_media, AggregationOutcome};
pub use discovery::{strategy_ladder, DiscoveryError, DiscoveryOutcome, DiscoveryService};
pub use filter::{is_excluded, CatalogFilter, MediaFilter};
pub use interleave::interleave_mixed;
pub use score::{catalog_relevance, rank_catalog, rank_tracks, track_quality_score};
