//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the vibescout server:
//! - HTTP request metrics (latency, counts, in-flight)
//! - Discovery pipeline metrics (quota trips, relaxed passes, floor misses)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vibescout_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vibescout_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "vibescout_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Discovery Pipeline Metrics
// =============================================================================

/// Upstream quota trips by source.
pub static QUOTA_TRIPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "vibescout_quota_trips_total",
            "Upstream quota trips surfaced to responses",
        ),
        &["endpoint"],
    )
    .unwrap()
});

/// Relaxed degradation passes by endpoint.
pub static RELAXED_PASSES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "vibescout_relaxed_passes_total",
            "Discovery runs that needed the relaxed pass",
        ),
        &["endpoint"],
    )
    .unwrap()
});

/// Discovery runs that missed the floor even after degradation.
pub static FLOOR_MISSES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "vibescout_floor_misses_total",
            "Discovery runs that ended below the result floor",
        ),
        &["endpoint"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(QUOTA_TRIPS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(RELAXED_PASSES_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(FLOOR_MISSES_TOTAL.clone()))
        .unwrap();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Normalize a path for metric labels (replace variable segments).
pub fn normalize_path(path: &str) -> String {
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();
    let mood_regex = regex_lite::Regex::new(r"/mood/[^/]+").unwrap();

    let result = numeric_regex.replace_all(path, "/{id}$1");
    let result = mood_regex.replace_all(&result, "/mood/{mood}");
    result.to_string()
}
