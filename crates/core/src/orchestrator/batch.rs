//! Batch runner.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::dispatcher::{DispatchError, DispatchOutcome, JobDispatcher};
use crate::metrics;
use crate::scanner::AutoEnqueueScanner;

use super::types::{BatchReport, StopReason};

/// Drains the job queue one job at a time, up to a fixed cap per run.
pub struct BatchRunner {
    dispatcher: Arc<JobDispatcher>,
    /// Runs before dispatching when auto-enqueue is on.
    scanner: Option<AutoEnqueueScanner>,
    max_jobs_per_run: usize,
    /// Serializes runs so scheduled and manual triggers never overlap.
    run_lock: Mutex<()>,
    last_report: RwLock<Option<BatchReport>>,
}

impl BatchRunner {
    pub fn new(
        dispatcher: Arc<JobDispatcher>,
        scanner: Option<AutoEnqueueScanner>,
        max_jobs_per_run: usize,
    ) -> Self {
        Self {
            dispatcher,
            scanner,
            max_jobs_per_run,
            run_lock: Mutex::new(()),
            last_report: RwLock::new(None),
        }
    }

    /// Resolve jobs left in `processing` by an earlier process.
    ///
    /// Holds the run lock: while a batch runs, its `processing` job is live.
    pub async fn recover(&self) -> Result<usize, DispatchError> {
        let _guard = self.run_lock.lock().await;
        self.dispatcher.recover_interrupted().await
    }

    /// Run one batch: optional scan, then sequential dispatch until the
    /// queue is idle, a systemic fault occurs, or the cap is reached.
    pub async fn run_once(&self) -> BatchReport {
        let _guard = self.run_lock.lock().await;
        let started_at = Utc::now();

        let (scan, scan_error) = match &self.scanner {
            Some(scanner) => match scanner.scan() {
                Ok(report) => (Some(report), None),
                Err(e) => {
                    warn!("Auto-enqueue scan failed, dispatching anyway: {}", e);
                    (None, Some(e.to_string()))
                }
            },
            None => (None, None),
        };

        let mut report = BatchReport {
            started_at,
            finished_at: started_at,
            scan,
            scan_error,
            processed: 0,
            completed: 0,
            failed: 0,
            retried: 0,
            claim_lost: 0,
            stop: StopReason::CapReached,
        };

        for _ in 0..self.max_jobs_per_run {
            match self.dispatcher.process_next().await {
                Ok(DispatchOutcome::Idle) => {
                    report.stop = StopReason::Idle;
                    break;
                }
                Ok(DispatchOutcome::ClaimLost { .. }) => report.claim_lost += 1,
                Ok(DispatchOutcome::Completed { .. }) => {
                    report.processed += 1;
                    report.completed += 1;
                }
                Ok(DispatchOutcome::Failed { .. }) => {
                    report.processed += 1;
                    report.failed += 1;
                }
                Ok(DispatchOutcome::RetryScheduled { .. }) => {
                    report.processed += 1;
                    report.retried += 1;
                }
                Err(e) => {
                    error!("Batch aborted: {}", e);
                    report.stop = StopReason::Systemic(e.to_string());
                    break;
                }
            }
        }

        report.finished_at = Utc::now();

        metrics::BATCH_RUNS
            .with_label_values(&[report.stop.label()])
            .inc();
        metrics::BATCH_JOBS
            .with_label_values(&[])
            .observe(report.processed as f64);

        if report.processed > 0 {
            info!(
                "Batch processed {} job(s): {} complete, {} failed, {} retrying",
                report.processed, report.completed, report.failed, report.retried
            );
        } else {
            debug!("Batch processed no jobs ({})", report.stop.label());
        }

        *self.last_report.write().await = Some(report.clone());
        report
    }

    pub async fn last_report(&self) -> Option<BatchReport> {
        self.last_report.read().await.clone()
    }
}
