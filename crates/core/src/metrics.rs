//! Prometheus metrics for the catalog engine.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts};

/// Remote catalog fetches by result.
pub static CATALOG_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "plugsync_catalog_fetches_total",
            "Total remote catalog fetches",
        ),
        &["result"], // "ok", "fetch_error", "normalize_error"
    )
    .unwrap()
});

/// Snapshot refresh duration in seconds.
pub static REFRESH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "plugsync_refresh_duration_seconds",
            "Duration of full snapshot refreshes",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .unwrap()
});

/// Snapshot cache reads by slot and result.
pub static CACHE_READS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("plugsync_cache_reads_total", "Total snapshot cache reads"),
        &["slot", "result"], // result: "hit", "miss", "error"
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CATALOG_FETCHES.clone()),
        Box::new(REFRESH_DURATION.clone()),
        Box::new(CACHE_READS.clone()),
    ]
}
