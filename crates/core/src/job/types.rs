//! Job types and the status state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a generation job.
///
/// Valid transitions:
///
/// ```text
/// pending       -> processing
/// pending_retry -> processing
/// processing    -> complete | error | pending_retry
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting for its first attempt.
    Pending,
    /// Claimed by the dispatcher.
    Processing,
    /// Audio produced and attached to the content item.
    Complete,
    /// Failed permanently.
    Error,
    /// Failed, waiting for a backoff to elapse before another attempt.
    PendingRetry,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Pending,
        JobStatus::Processing,
        JobStatus::Complete,
        JobStatus::Error,
        JobStatus::PendingRetry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Complete => "complete",
            JobStatus::Error => "error",
            JobStatus::PendingRetry => "pending_retry",
        }
    }

    /// Terminal states never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error)
    }

    /// Active jobs block creation of another job for the same content item.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Whether the dispatcher may claim a job in this state.
    pub fn is_claimable(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::PendingRetry)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (PendingRetry, Processing)
                | (Processing, Complete)
                | (Processing, Error)
                | (Processing, PendingRetry)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown job status: {}", s))
    }
}

/// A tracked unit of pipeline work: one audio-generation attempt chain for
/// a content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub content_id: String,
    pub status: JobStatus,
    /// Message of the last failure, cleared when the job is claimed again.
    pub error: Option<String>,
    /// How many times the job has been claimed.
    pub attempts: u32,
    /// Earliest time a `pending_retry` job may be claimed.
    pub next_attempt_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
