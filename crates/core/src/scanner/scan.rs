//! Scanner implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::content::{ContentFilter, ContentItem, ContentStatus, ContentStore};
use crate::job::{CreateJobRequest, Job, JobError, JobFilter, JobStore};
use crate::metrics;

use super::types::{ScanError, ScanReport};

/// Creates jobs for content items that are missing audio.
#[derive(Clone)]
pub struct AutoEnqueueScanner {
    job_store: Arc<dyn JobStore>,
    content_store: Arc<dyn ContentStore>,
    scan_limit: i64,
}

impl AutoEnqueueScanner {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        content_store: Arc<dyn ContentStore>,
        scan_limit: i64,
    ) -> Self {
        Self {
            job_store,
            content_store,
            scan_limit,
        }
    }

    /// Create one pending job for every pending item without final audio
    /// that no job references yet, at most `scan_limit` per scan.
    ///
    /// Pages through candidates oldest first, so items whose jobs already
    /// exist never starve newer ones. Idempotent, and never touches content.
    /// Per-item faults are logged and counted; only a failure of a content
    /// query is returned.
    pub fn scan(&self) -> Result<ScanReport, ScanError> {
        let mut report = ScanReport::default();
        let mut offset = 0;

        loop {
            let filter = ContentFilter::awaiting_audio()
                .with_limit(self.scan_limit)
                .with_offset(offset);
            let items = self.content_store.list(&filter)?;

            for item in &items {
                if report.enqueued as i64 >= self.scan_limit {
                    break;
                }
                report.examined += 1;
                match self.enqueue_if_missing(item) {
                    Ok(true) => report.enqueued += 1,
                    Ok(false) => report.already_queued += 1,
                    Err(e) => {
                        warn!("Failed to enqueue content {}: {}", item.id, e);
                        metrics::SCAN_FAILURES.inc();
                        report.failed += 1;
                    }
                }
            }

            if (items.len() as i64) < self.scan_limit
                || report.enqueued as i64 >= self.scan_limit
            {
                break;
            }
            offset += self.scan_limit;
        }

        if report.enqueued > 0 || report.failed > 0 {
            info!(
                "Scan examined {} item(s): {} enqueued, {} already queued, {} failed",
                report.examined, report.enqueued, report.already_queued, report.failed
            );
        } else {
            debug!("Scan examined {} item(s), nothing to enqueue", report.examined);
        }

        Ok(report)
    }

    /// Returns whether a job was created.
    fn enqueue_if_missing(&self, item: &ContentItem) -> Result<bool, JobError> {
        let existing = self
            .job_store
            .count(&JobFilter::new().with_content_id(&item.id))?;
        if existing > 0 {
            return Ok(false);
        }

        match self.job_store.create(CreateJobRequest::new(&item.id)) {
            Ok(job) => {
                debug!("Enqueued job {} for content {}", job.id, item.id);
                metrics::JOBS_ENQUEUED.with_label_values(&["scan"]).inc();
                Ok(true)
            }
            // Raced with an explicit enqueue.
            Err(JobError::AlreadyActive { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Explicitly enqueue a content item.
    ///
    /// The item must exist, must not be ready, and must not already have an
    /// active job. Content is not modified.
    pub fn enqueue(&self, content_id: &str) -> Result<Job, ScanError> {
        let item = self
            .content_store
            .get(content_id)?
            .ok_or_else(|| ScanError::ContentNotFound(content_id.to_string()))?;

        if item.status == ContentStatus::Ready {
            return Err(ScanError::AlreadyReady(item.id));
        }

        match self.job_store.create(CreateJobRequest::new(&item.id)) {
            Ok(job) => {
                info!("Enqueued job {} for content {} on request", job.id, item.id);
                metrics::JOBS_ENQUEUED.with_label_values(&["request"]).inc();
                Ok(job)
            }
            Err(JobError::AlreadyActive { .. }) => {
                let active = self
                    .job_store
                    .list(&JobFilter::new().with_content_id(&item.id))?
                    .into_iter()
                    .find(|job| job.status.is_active())
                    .map(|job| job.id)
                    .unwrap_or_default();
                Err(ScanError::AlreadyQueued {
                    content_id: item.id,
                    job_id: active,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
