//! Full-pipeline endpoints: mood discovery and media search aggregation.

mod common;

use axum::http::StatusCode;
use common::{fixtures, TestFixture};
use vibescout_core::testing::{MockCatalogApi, MockMediaSearchApi};
use vibescout_core::{ContentKind, TrackStats};

fn happy_catalog(movie_count: u32, series_count: u32) -> MockCatalogApi {
    MockCatalogApi::new()
        .with_page(
            ContentKind::Movie,
            1,
            (1..=movie_count)
                .map(|i| fixtures::catalog_item(i, ContentKind::Movie, vec![35]))
                .collect(),
            1,
        )
        .with_page(
            ContentKind::Series,
            1,
            (101..=(100 + series_count))
                .map(|i| fixtures::catalog_item(i, ContentKind::Series, vec![10751]))
                .collect(),
            1,
        )
}

#[tokio::test]
async fn test_mood_discovery_interleaves_movies_and_series() {
    let fixture = TestFixture::with_mocks(happy_catalog(10, 10), Default::default());

    let response = fixture.get("/api/v1/mood/happy?count=10").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["mood"], "happy");
    assert_eq!(response.body["count"], 10);
    assert_eq!(response.body["met_floor"], true);
    assert!(response.body.get("used_relaxed").is_none());

    let kinds: Vec<&str> = response.body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["kind"].as_str().unwrap())
        .collect();
    // Two movies per series slot, 60/40 overall.
    assert_eq!(&kinds[..3], &["movie", "movie", "series"]);
    assert_eq!(kinds.iter().filter(|k| **k == "movie").count(), 6);
}

#[tokio::test]
async fn test_mood_name_is_case_insensitive() {
    let fixture = TestFixture::with_mocks(happy_catalog(10, 10), Default::default());

    let response = fixture.get("/api/v1/mood/HAPPY?count=10").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["mood"], "happy");
}

#[tokio::test]
async fn test_unknown_mood_is_bad_request() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/mood/bored").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].as_str().unwrap().contains("bored"));
}

#[tokio::test]
async fn test_mood_quota_with_no_results_returns_503() {
    let catalog = MockCatalogApi::new()
        .with_quota_from_page(ContentKind::Movie, 1)
        .with_quota_from_page(ContentKind::Series, 1);
    let fixture = TestFixture::with_mocks(catalog, Default::default());

    let response = fixture.get("/api/v1/mood/happy").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_mood_quota_with_partial_results_keeps_200() {
    // Movies aggregate fine; the series side trips the quota immediately.
    let catalog = happy_catalog(10, 0).with_quota_from_page(ContentKind::Series, 1);
    let fixture = TestFixture::with_mocks(catalog, Default::default());

    let response = fixture.get("/api/v1/mood/happy?count=10&relax=false").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["quota_exceeded"], true);
    assert!(response.body["count"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_search_requires_query() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/aggregate-search").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = fixture.get("/api/v1/aggregate-search?q=%20").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_mood_keywords_seed_the_ladder() {
    let media = MockMediaSearchApi::new()
        .with_results(
            "happy upbeat pop cheerful official audio topic",
            vec![fixtures::media_track("a"), fixtures::media_track("b")],
        )
        .with_stats("a", TrackStats { view_count: 2_000_000, like_count: 5_000 })
        .with_stats("b", TrackStats { view_count: 500_000, like_count: 100 });
    let fixture = TestFixture::with_mocks(Default::default(), media);

    let response = fixture.get("/api/v1/aggregate-search?mood=happy").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["query"], "happy upbeat pop cheerful");
    assert_eq!(response.body["total"], 2);

    let recorded = fixture.media.recorded_queries();
    assert!(recorded.contains(&"happy upbeat pop cheerful official audio topic".to_string()));
}

#[tokio::test]
async fn test_search_unknown_mood_is_bad_request() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/aggregate-search?mood=bored").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].as_str().unwrap().contains("bored"));
}

#[tokio::test]
async fn test_search_merges_stats_ranks_and_truncates() {
    let media = MockMediaSearchApi::new()
        .with_results(
            "neon official audio topic",
            vec![
                fixtures::media_track("mid"),
                fixtures::media_track("big"),
                fixtures::media_track("small"),
            ],
        )
        .with_stats("mid", TrackStats { view_count: 500_000, like_count: 2_000 })
        .with_stats("big", TrackStats { view_count: 20_000_000, like_count: 90_000 })
        .with_stats("small", TrackStats { view_count: 6_000, like_count: 10 });
    let fixture = TestFixture::with_mocks(Default::default(), media);

    let response = fixture.get("/api/v1/aggregate-search?q=neon&limit=2").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["query"], "neon");
    assert_eq!(response.body["total"], 2);
    assert_eq!(response.body["met_floor"], true);
    assert_eq!(response.body["items"][0]["id"], "big");
    assert_eq!(response.body["items"][0]["view_count"], 20_000_000);
}

#[tokio::test]
async fn test_search_strategies_override_ladder() {
    let media = MockMediaSearchApi::new().with_results(
        "alpha",
        vec![fixtures::media_track("a"), fixtures::media_track("b")],
    );
    let fixture = TestFixture::with_mocks(Default::default(), media);

    let response = fixture
        .get("/api/v1/aggregate-search?q=ignored&strategies=alpha,beta")
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let recorded = fixture.media.recorded_queries();
    assert!(recorded.contains(&"alpha".to_string()));
    assert!(recorded.contains(&"beta".to_string()));
    assert!(!recorded.contains(&"ignored official audio topic".to_string()));
}

#[tokio::test]
async fn test_search_quota_with_no_results_returns_503() {
    let media = MockMediaSearchApi::new().with_quota("neon official audio topic");
    let fixture = TestFixture::with_mocks(Default::default(), media);

    let response = fixture.get("/api/v1/aggregate-search?q=neon").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_search_below_floor_reports_relaxed_pass() {
    // One low-engagement track and a floor of 15: the relaxed pass runs,
    // readmits it on pattern grounds, and the response says so.
    let media = MockMediaSearchApi::new()
        .with_results("neon official audio topic", vec![fixtures::media_track("low")])
        .with_stats("low", TrackStats { view_count: 10, like_count: 0 });
    let fixture =
        TestFixture::with_pipeline(Default::default(), media, Default::default());

    let response = fixture.get("/api/v1/aggregate-search?q=neon").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["used_relaxed"], true);
    assert_eq!(response.body["met_floor"], false);
    assert_eq!(response.body["total"], 1);
}
