//! Thin wrappers over the `metrics` crate's macros.
//!
//! Centralizing the metric names here keeps the Reconciler, Cache Processor,
//! and Orchestrator from hand-rolling label strings at every call site.

use std::time::Duration;

pub fn record_cas_retry(store: &str) {
    metrics::counter!("cache_cas_retries_total", "store" => store.to_string()).increment(1);
}

pub fn record_cas_exhausted(store: &str) {
    metrics::counter!("cache_cas_retries_exhausted_total", "store" => store.to_string()).increment(1);
}

pub fn record_queue_full(operation: &str) {
    metrics::counter!("cache_queue_full_total", "operation" => operation.to_string()).increment(1);
}

pub fn record_job_duration(operation: &str, outcome: &str, duration: Duration) {
    metrics::histogram!(
        "cache_job_duration_seconds",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .record(duration.as_secs_f64());
}

pub fn record_hss_roundtrip(request_type: &str, outcome: &str, duration: Duration) {
    metrics::histogram!(
        "cache_hss_roundtrip_seconds",
        "request_type" => request_type.to_string(),
        "outcome" => outcome.to_string()
    )
    .record(duration.as_secs_f64());
}

pub fn record_queue_depth(depth: usize) {
    metrics::gauge!("cache_queue_depth").set(depth as f64);
}
