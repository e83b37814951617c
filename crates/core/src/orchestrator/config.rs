//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::dispatcher::RetryPolicy;

/// Configuration for the pipeline scheduler and batch runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Enable/disable the background scheduler.
    /// When disabled, batches only run when triggered via API.
    #[serde(default)]
    pub enabled: bool,

    /// Delay between scheduled batch runs (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Upper bound on dispatcher iterations per batch run.
    #[serde(default = "default_max_jobs_per_run")]
    pub max_jobs_per_run: usize,

    /// Run the auto-enqueue scanner at the start of every batch.
    #[serde(default = "default_true")]
    pub auto_enqueue: bool,

    /// Maximum content items examined per scan.
    #[serde(default = "default_scan_limit")]
    pub scan_limit: i64,

    /// Retries allowed per job after the first attempt (0 = no retries).
    #[serde(default)]
    pub max_retries: u32,

    /// Backoff before the first retry; doubles on every further attempt.
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_secs: u64,

    /// Upper bound on the retry backoff.
    #[serde(default = "default_retry_max_delay")]
    pub retry_max_delay_secs: u64,
}

fn default_poll_interval() -> u64 {
    30_000 // 30 seconds
}

fn default_max_jobs_per_run() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_scan_limit() -> i64 {
    100
}

fn default_retry_base_delay() -> u64 {
    60
}

fn default_retry_max_delay() -> u64 {
    3600
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            poll_interval_ms: default_poll_interval(),
            max_jobs_per_run: default_max_jobs_per_run(),
            auto_enqueue: true,
            scan_limit: default_scan_limit(),
            max_retries: 0,
            retry_base_delay_secs: default_retry_base_delay(),
            retry_max_delay_secs: default_retry_max_delay(),
        }
    }
}

impl PipelineConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay_secs: self.retry_base_delay_secs,
            max_delay_secs: self.retry_max_delay_secs,
        }
    }
}
