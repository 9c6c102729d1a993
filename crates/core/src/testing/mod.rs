//! Testing utilities: mock upstream fetchers and fixtures.
//!
//! Available to integration tests and downstream crates; not compiled into
//! release semantics beyond the module itself.

mod mock_catalog;
mod mock_media;

pub use mock_catalog::MockCatalogApi;
pub use mock_media::MockMediaSearchApi;

/// Fixture builders for common test data.
pub mod fixtures {
    use crate::upstream::{CatalogItem, ContentKind, MediaTrack};

    /// A catalog item that passes the strict filter.
    pub fn catalog_item(id: u32, kind: ContentKind, genre_ids: Vec<u32>) -> CatalogItem {
        CatalogItem {
            id,
            kind,
            title: format!("Title {id}"),
            overview: Some("An overview long enough to pass the length check.".to_string()),
            poster_path: Some(format!("/poster-{id}.jpg")),
            release_date: Some("2015-06-01".to_string()),
            genre_ids,
            popularity: 50.0,
            vote_average: 7.0,
            vote_count: 500,
        }
    }

    /// A track that passes the strict filter once stats give it views.
    pub fn media_track(id: &str) -> MediaTrack {
        MediaTrack {
            id: id.to_string(),
            title: format!("Song {id} (Official Audio)"),
            channel: "ArtistVEVO".to_string(),
            thumbnail: Some(format!("https://img.example/{id}.jpg")),
            view_count: 0,
            like_count: 0,
        }
    }
}
