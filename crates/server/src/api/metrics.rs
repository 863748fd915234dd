//! Prometheus metrics recording.

use metrics::{counter, gauge, histogram};
use std::time::Duration;
use zipsearch_core::{BuildSummary, Catalogue};

/// Records HTTP request metrics.
pub fn record_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Records one executed search and its hit count.
pub fn record_search(results: usize) {
    counter!("zipsearch_search_total").increment(1);
    histogram!("zipsearch_search_results").record(results as f64);
}

/// Records a finished rebuild.
pub fn record_rebuild(summary: &BuildSummary, duration: Duration) {
    counter!("zipsearch_rebuild_total").increment(1);
    histogram!("zipsearch_rebuild_duration_seconds").record(duration.as_secs_f64());
    gauge!("zipsearch_postings_total").set(summary.postings as f64);
}

/// Updates catalogue size gauges after a load or swap.
pub fn update_catalogue_metrics(catalogue: &Catalogue) {
    gauge!("zipsearch_records_total").set(catalogue.record_count() as f64);
    gauge!("zipsearch_bigrams_total").set(catalogue.bigram_count() as f64);
}
