//! Upstream fetchers: the catalog (TMDB-shaped) and media search
//! (YouTube-shaped) APIs behind the [`CatalogApi`] and [`MediaSearchApi`]
//! traits. The fetcher boundary owns error classification: nothing above it
//! ever sees a raw transport error.

mod tmdb;
mod types;
mod youtube;

pub use tmdb::TmdbCatalog;
pub use types::*;
pub use youtube::YouTubeMediaSearch;
