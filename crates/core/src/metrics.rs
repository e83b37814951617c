//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Dispatcher (jobs processed, generation and mixing durations)
//! - Auto-enqueue scanner (jobs enqueued, per-item failures)
//! - Batch runner (runs by stop reason, jobs per run)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Dispatcher Metrics
// =============================================================================

/// Jobs processed total by result.
pub static JOBS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("meditone_jobs_processed_total", "Total jobs processed"),
        &["result"], // "complete", "error", "retry"
    )
    .unwrap()
});

/// End-to-end job duration in seconds.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "meditone_job_duration_seconds",
            "Duration of one dispatched job",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["result"],
    )
    .unwrap()
});

/// Narration synthesis duration in seconds.
pub static GENERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "meditone_generation_duration_seconds",
            "Duration of narration synthesis",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Mixing duration in seconds.
pub static MIXING_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("meditone_mixing_duration_seconds", "Duration of mixing")
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Scanner Metrics
// =============================================================================

/// Jobs created by the scanner or explicit enqueue requests.
pub static JOBS_ENQUEUED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("meditone_jobs_enqueued_total", "Total jobs enqueued"),
        &["source"], // "scan", "request"
    )
    .unwrap()
});

/// Content items the scanner failed to process.
pub static SCAN_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "meditone_scan_failures_total",
        "Content items skipped because of a scan fault",
    )
    .unwrap()
});

// =============================================================================
// Batch Metrics
// =============================================================================

/// Batch runs by stop reason.
pub static BATCH_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("meditone_batch_runs_total", "Total batch runs"),
        &["stop"], // "idle", "cap_reached", "systemic"
    )
    .unwrap()
});

/// Jobs processed per batch run.
pub static BATCH_JOBS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "meditone_batch_jobs_processed",
            "Number of jobs processed per batch run",
        )
        .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Dispatcher
        Box::new(JOBS_PROCESSED.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(GENERATION_DURATION.clone()),
        Box::new(MIXING_DURATION.clone()),
        // Scanner
        Box::new(JOBS_ENQUEUED.clone()),
        Box::new(SCAN_FAILURES.clone()),
        // Batch
        Box::new(BATCH_RUNS.clone()),
        Box::new(BATCH_JOBS.clone()),
    ]
}
