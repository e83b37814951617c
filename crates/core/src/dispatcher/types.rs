//! Types for the job dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::{AudioRef, ContentError};
use crate::generator::GenerationError;
use crate::job::JobError;
use crate::mixer::MixError;

/// Result of one `process_next` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// No claimable job.
    Idle,
    /// The selected job was claimed by someone else first.
    ClaimLost { job_id: String },
    Completed {
        job_id: String,
        content_id: String,
        final_audio: AudioRef,
    },
    Failed {
        job_id: String,
        content_id: String,
        error: String,
    },
    RetryScheduled {
        job_id: String,
        content_id: String,
        error: String,
        next_attempt_at: DateTime<Utc>,
    },
}

impl DispatchOutcome {
    /// Whether a job was driven to a new resting state.
    pub fn is_processed(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::Completed { .. }
                | DispatchOutcome::Failed { .. }
                | DispatchOutcome::RetryScheduled { .. }
        )
    }
}

/// A fault fatal to the current job attempt only.
#[derive(Debug, Error)]
pub enum JobFault {
    /// The job references a content item that does not exist.
    #[error("content item not found: {0}")]
    ContentMissing(String),

    /// Neither the item nor the configuration provide an ambient track.
    #[error("no ambient track available")]
    NoAmbientTrack,

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("mixing failed: {0}")]
    Mixing(#[from] MixError),

    #[error("content store error: {0}")]
    ContentStore(#[from] ContentError),
}

impl JobFault {
    /// Whether a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            JobFault::ContentMissing(_) | JobFault::NoAmbientTrack => false,
            JobFault::Generation(e) => e.is_retryable(),
            JobFault::Mixing(e) => e.is_retryable(),
            JobFault::ContentStore(ContentError::NotFound(_)) => false,
            JobFault::ContentStore(ContentError::Database(_)) => true,
        }
    }

    /// Whether the referenced content item is known to exist.
    pub fn content_exists(&self) -> bool {
        !matches!(
            self,
            JobFault::ContentMissing(_) | JobFault::ContentStore(ContentError::NotFound(_))
        )
    }
}

/// A fault that affects the whole batch, not just one job.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The job store could not be queried or updated.
    #[error("job store error: {0}")]
    Store(#[from] JobError),

    /// A job failed and recording the failure failed as well.
    #[error("failed to record failure of job {job_id}: {reason}")]
    Recovery { job_id: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_processed() {
        assert!(!DispatchOutcome::Idle.is_processed());
        assert!(!DispatchOutcome::ClaimLost {
            job_id: "j".to_string()
        }
        .is_processed());
        assert!(DispatchOutcome::Failed {
            job_id: "j".to_string(),
            content_id: "c".to_string(),
            error: "x".to_string(),
        }
        .is_processed());
    }

    #[test]
    fn test_fault_classification() {
        let missing = JobFault::ContentMissing("c1".to_string());
        assert!(!missing.is_retryable());
        assert!(!missing.content_exists());

        let tts = JobFault::Generation(GenerationError::Http("reset".to_string()));
        assert!(tts.is_retryable());
        assert!(tts.content_exists());
    }

    #[test]
    fn test_fault_display() {
        let fault = JobFault::Generation(GenerationError::EmptyScript);
        assert_eq!(
            fault.to_string(),
            "generation failed: Narration script is empty"
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(DispatchOutcome::Idle).unwrap();
        assert_eq!(json["outcome"], "idle");
    }
}
