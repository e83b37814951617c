//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the meditone server:
//! - HTTP request metrics (latency, counts)
//! - Job counts by status and scheduler state (collected dynamically)
//! - Pipeline metrics from the core crate

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

use meditone_core::{JobFilter, JobStatus};

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
            "meditone_http_request_duration_seconds",
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
        Opts::new("meditone_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "meditone_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Pipeline State (collected dynamically)
// =============================================================================

/// Jobs by current status.
pub static JOBS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("meditone_jobs_by_status", "Current job count by status"),
        &["status"],
    )
    .unwrap()
});

/// Scheduler running state (1 = running, 0 = stopped).
pub static PIPELINE_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "meditone_pipeline_running",
        "Whether the pipeline scheduler is running (1) or stopped (0)",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Pipeline state
    registry
        .register(Box::new(JOBS_BY_STATUS.clone()))
        .unwrap();
    registry
        .register(Box::new(PIPELINE_RUNNING.clone()))
        .unwrap();

    // Core metrics (dispatcher, scanner, batch runner)
    for metric in meditone_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the job store at scrape time.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    PIPELINE_RUNNING.set(if state.orchestrator().is_running() { 1 } else { 0 });

    let job_store = state.job_store();
    for status in JobStatus::ALL {
        let filter = JobFilter::new().with_status(status);
        if let Ok(count) = job_store.count(&filter) {
            JOBS_BY_STATUS
                .with_label_values(&[status.as_str()])
                .set(count);
        }
    }
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let uuid_regex = regex_lite::Regex::new(
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    )
    .unwrap();
    // Content IDs are assigned upstream and may be any slug.
    let content_regex = regex_lite::Regex::new(r"^/api/v1/content/[^/]+").unwrap();

    let result = uuid_regex.replace_all(path, "{id}");
    let result = content_regex.replace(&result, "/api/v1/content/{id}");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/api/v1/jobs/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/api/v1/jobs/{id}");
    }

    #[test]
    fn test_normalize_path_content_slug() {
        let path = "/api/v1/content/evening-body-scan/jobs";
        assert_eq!(normalize_path(path), "/api/v1/content/{id}/jobs");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        let path = "/api/v1/pipeline/status";
        assert_eq!(normalize_path(path), "/api/v1/pipeline/status");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("meditone_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_all_metrics() {
        // Prometheus only outputs metrics that have been accessed
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        JOBS_BY_STATUS.with_label_values(&["pending"]).set(0);
        PIPELINE_RUNNING.set(0);
        meditone_core::metrics::BATCH_RUNS
            .with_label_values(&["idle"])
            .inc();

        let output = encode_metrics();

        assert!(output.contains("meditone_http_request_duration_seconds"));
        assert!(output.contains("meditone_http_requests_in_flight"));
        assert!(output.contains("meditone_jobs_by_status"));
        assert!(output.contains("meditone_pipeline_running"));
        assert!(output.contains("meditone_batch_runs_total"));
    }
}
