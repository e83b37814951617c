//! Job storage trait and types.

use std::fmt;

use chrono::{DateTime, Utc};

use super::{Job, JobStatus};

/// Error type for job operations.
#[derive(Debug)]
pub enum JobError {
    /// Job not found.
    NotFound(String),
    /// The content item already has a pending or processing job.
    AlreadyActive { content_id: String },
    /// Transition not allowed from the job's current status.
    InvalidState {
        job_id: String,
        current: JobStatus,
        requested: JobStatus,
    },
    /// Database error.
    Database(String),
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::NotFound(id) => write!(f, "Job not found: {}", id),
            JobError::AlreadyActive { content_id } => {
                write!(f, "Content {} already has an active job", content_id)
            }
            JobError::InvalidState {
                job_id,
                current,
                requested,
            } => write!(
                f,
                "Cannot move job {} from {} to {}",
                job_id, current, requested
            ),
            JobError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for JobError {}

/// Request to create a new job. Jobs always start in `pending`.
#[derive(Debug, Clone)]
pub struct CreateJobRequest {
    /// Content item the job renders.
    pub content_id: String,
}

impl CreateJobRequest {
    pub fn new(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
        }
    }
}

/// Transitions out of `processing`.
#[derive(Debug, Clone, PartialEq)]
pub enum JobTransition {
    /// Finished successfully; clears any error message.
    Complete,
    /// Failed permanently.
    Fail { error: String },
    /// Failed, eligible for another attempt once `next_attempt_at` passes.
    Retry {
        error: String,
        next_attempt_at: DateTime<Utc>,
    },
}

impl JobTransition {
    pub fn target(&self) -> JobStatus {
        match self {
            JobTransition::Complete => JobStatus::Complete,
            JobTransition::Fail { .. } => JobStatus::Error,
            JobTransition::Retry { .. } => JobStatus::PendingRetry,
        }
    }
}

/// Filter for querying jobs.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Filter by status.
    pub status: Option<JobStatus>,
    /// Filter by referenced content item.
    pub content_id: Option<String>,
    /// Only jobs whose `next_attempt_at` is at or before this instant.
    pub due_at: Option<DateTime<Utc>>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl JobFilter {
    /// Create a new filter with defaults.
    pub fn new() -> Self {
        Self {
            status: None,
            content_id: None,
            due_at: None,
            limit: 100,
            offset: 0,
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    pub fn due_at(mut self, now: DateTime<Utc>) -> Self {
        self.due_at = Some(now);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Trait for job storage backends.
pub trait JobStore: Send + Sync {
    /// Create a new pending job.
    ///
    /// Fails with [`JobError::AlreadyActive`] when the content item already
    /// has an active job.
    fn create(&self, request: CreateJobRequest) -> Result<Job, JobError>;

    /// Get a job by ID.
    fn get(&self, id: &str) -> Result<Option<Job>, JobError>;

    /// List jobs matching the filter, oldest first with insertion order as
    /// tie-break.
    fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, JobError>;

    /// Count jobs matching the filter.
    fn count(&self, filter: &JobFilter) -> Result<i64, JobError>;

    /// Atomically move a claimable job to `processing`, clearing its error
    /// and bumping `attempts`.
    ///
    /// Returns `None` when the job exists but is no longer claimable, i.e.
    /// someone else got there first.
    fn claim(&self, id: &str) -> Result<Option<Job>, JobError>;

    /// Move a `processing` job to its next state.
    fn transition(&self, id: &str, transition: JobTransition) -> Result<Job, JobError>;
}
