//! Types for the scanner module.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::ContentError;
use crate::job::JobError;

/// Counters for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Content items that matched the sweep filter.
    pub examined: usize,
    /// Jobs created by this scan.
    pub enqueued: usize,
    /// Items skipped because a job already references them.
    pub already_queued: usize,
    /// Items that could not be checked or enqueued.
    pub failed: usize,
}

/// Errors from the scanner.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("content item not found: {0}")]
    ContentNotFound(String),

    #[error("content item {0} already has final audio")]
    AlreadyReady(String),

    #[error("content item {content_id} already has an active job {job_id}")]
    AlreadyQueued { content_id: String, job_id: String },

    #[error("content store error: {0}")]
    Content(#[from] ContentError),

    #[error("job store error: {0}")]
    Job(#[from] JobError),
}
