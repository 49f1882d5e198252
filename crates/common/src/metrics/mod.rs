//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all webtrees metrics
pub const METRICS_PREFIX: &str = "webtrees";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 150ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.075,  // 75ms
    0.100,  // 100ms
    0.150,  // 150ms - P99 target
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Record metrics
    describe_counter!(
        format!("{}_record_lookups_total", METRICS_PREFIX),
        Unit::Count,
        "Record lookups that reached the store"
    );

    describe_counter!(
        format!("{}_visibility_checks_total", METRICS_PREFIX),
        Unit::Count,
        "Kind-specific visibility decisions, by record type and outcome"
    );

    // Block metrics
    describe_counter!(
        format!("{}_block_renders_total", METRICS_PREFIX),
        Unit::Count,
        "Dashboard blocks rendered"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record a record lookup against the store
pub fn record_lookup(found: bool) {
    let outcome = if found { "found" } else { "missing" };

    counter!(
        format!("{}_record_lookups_total", METRICS_PREFIX),
        "outcome" => outcome
    )
    .increment(1);
}

/// Helper to record a visibility decision
pub fn record_visibility(record_type: &str, shown: bool) {
    let outcome = if shown { "shown" } else { "hidden" };

    counter!(
        format!("{}_visibility_checks_total", METRICS_PREFIX),
        "type" => record_type.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Helper to record a block render
pub fn record_block_render(module: &str, chart_type: &str) {
    counter!(
        format!("{}_block_renders_total", METRICS_PREFIX),
        "module" => module.to_string(),
        "chart" => chart_type.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        // Verify buckets are sorted and contain SLO targets
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        assert!(LATENCY_BUCKETS.contains(&0.050));
        assert!(LATENCY_BUCKETS.contains(&0.150));
    }

    #[test]
    fn test_helpers_without_recorder() {
        let metrics = RequestMetrics::start("GET", "/trees/{tree}/media/{xref}");
        metrics.finish(200);
        record_lookup(false);
        record_visibility("OBJE", true);
        record_block_render("charts", "pedigree");
    }
}
