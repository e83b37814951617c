//! Types for the pipeline orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scanner::ScanReport;

/// Why a batch run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "message", rename_all = "snake_case")]
pub enum StopReason {
    /// The queue ran dry.
    Idle,
    /// `max_jobs_per_run` iterations were used up.
    CapReached,
    /// A store-level fault ended the batch early.
    Systemic(String),
}

impl StopReason {
    /// Metric label for this reason.
    pub fn label(&self) -> &'static str {
        match self {
            StopReason::Idle => "idle",
            StopReason::CapReached => "cap_reached",
            StopReason::Systemic(_) => "systemic",
        }
    }
}

/// Summary of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Scanner counters, when the scan ran and succeeded.
    pub scan: Option<ScanReport>,
    /// Scanner failure, when the scan ran and failed.
    pub scan_error: Option<String>,
    /// Jobs driven to a new resting state.
    pub processed: usize,
    pub completed: usize,
    pub failed: usize,
    pub retried: usize,
    pub claim_lost: usize,
    pub stop: StopReason,
}

/// Current status of the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStatus {
    /// Whether the background scheduler is running.
    pub running: bool,
    pub pending_count: usize,
    /// Should be 0 or 1.
    pub processing_count: usize,
    pub pending_retry_count: usize,
    pub complete_count: usize,
    pub error_count: usize,
    /// Most recent batch run, scheduled or manual.
    pub last_run: Option<BatchReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_reason_serialization() {
        let json = serde_json::to_value(StopReason::Systemic("db gone".to_string())).unwrap();
        assert_eq!(json["reason"], "systemic");
        assert_eq!(json["message"], "db gone");

        let json = serde_json::to_value(StopReason::CapReached).unwrap();
        assert_eq!(json["reason"], "cap_reached");
    }

    #[test]
    fn test_stop_reason_label() {
        assert_eq!(StopReason::Idle.label(), "idle");
        assert_eq!(StopReason::Systemic(String::new()).label(), "systemic");
    }

    #[test]
    fn test_status_default() {
        let status = PipelineStatus::default();
        assert!(!status.running);
        assert_eq!(status.pending_count, 0);
        assert!(status.last_run.is_none());
    }
}
