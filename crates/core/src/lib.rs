pub mod cache;
pub mod config;
pub mod moods;
pub mod pipeline;
pub mod testing;
pub mod upstream;

pub use cache::{MemoryCache, RequestSignature, ResponseCache, SqliteCache, TieredCache};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use moods::{MoodProfile, MoodTable};
pub use pipeline::{
    strategy_ladder, AggregationOutcome, DiscoveryError, DiscoveryOutcome, DiscoveryService,
};
pub use upstream::{
    CatalogApi, CatalogItem, CatalogPage, ContentKind, DiscoverFilters, FetchError,
    MediaSearchApi, MediaTrack, TmdbCatalog, TrackStats, YearFilter, YouTubeMediaSearch,
};
