//! Pipeline orchestrator implementation.
//!
//! Owns the dispatcher, scanner and batch runner, and plays the role of the
//! periodic trigger:
//! - Startup: resolve jobs left in `processing` by a previous run
//! - Poll loop: one batch every `poll_interval_ms`
//! - Manual: `trigger()` runs a batch immediately, serialized with the loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::content::ContentStore;
use crate::dispatcher::{DispatcherConfig, JobDispatcher, MixPolicy};
use crate::generator::NarrationGenerator;
use crate::job::{Job, JobError, JobFilter, JobStatus, JobStore};
use crate::mixer::Mixer;
use crate::scanner::{AutoEnqueueScanner, ScanError};

use super::batch::BatchRunner;
use super::config::PipelineConfig;
use super::types::{BatchReport, PipelineStatus};

/// The pipeline orchestrator - drains the job queue in periodic batches.
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    job_store: Arc<dyn JobStore>,
    dispatcher: Arc<JobDispatcher>,
    scanner: AutoEnqueueScanner,
    batch: Arc<BatchRunner>,

    // Runtime state
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: PipelineConfig,
        mix: MixPolicy,
        job_store: Arc<dyn JobStore>,
        content_store: Arc<dyn ContentStore>,
        generator: Arc<dyn NarrationGenerator>,
        mixer: Arc<dyn Mixer>,
    ) -> Self {
        let dispatcher = Arc::new(JobDispatcher::new(
            DispatcherConfig {
                mix,
                retry: config.retry_policy(),
            },
            Arc::clone(&job_store),
            Arc::clone(&content_store),
            generator,
            mixer,
        ));

        let scanner = AutoEnqueueScanner::new(
            Arc::clone(&job_store),
            content_store,
            config.scan_limit,
        );

        let batch = Arc::new(BatchRunner::new(
            Arc::clone(&dispatcher),
            config.auto_enqueue.then(|| scanner.clone()),
            config.max_jobs_per_run,
        ));

        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            job_store,
            dispatcher,
            scanner,
            batch,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            poll_task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &JobDispatcher {
        &self.dispatcher
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start the orchestrator (recovers stale jobs, spawns the poll loop).
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Orchestrator already running");
            return;
        }

        info!("Starting pipeline orchestrator");

        // Jobs left in processing by a crash would otherwise never resolve
        match self.batch.recover().await {
            Ok(0) => {}
            Ok(n) => info!("Recovered {} interrupted job(s)", n),
            Err(e) => error!("Failed to recover interrupted jobs: {}", e),
        }

        let handle = self.spawn_poll_loop();
        *self.poll_task.lock().await = Some(handle);

        info!("Pipeline orchestrator started");
    }

    /// Stop the orchestrator, waiting for an in-flight batch to finish.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Orchestrator not running");
            return;
        }

        info!("Stopping pipeline orchestrator");

        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.poll_task.lock().await.take() {
            if let Err(e) = handle.await {
                error!("Poll loop ended abnormally: {}", e);
            }
        }

        info!("Pipeline orchestrator stopped");
    }

    /// Get current pipeline status.
    pub async fn status(&self) -> Result<PipelineStatus, JobError> {
        let count = |status: JobStatus| -> Result<usize, JobError> {
            let n = self
                .job_store
                .count(&JobFilter::new().with_status(status))
                .inspect_err(|e| warn!("Failed to count {} jobs: {}", status.as_str(), e))?;
            Ok(n as usize)
        };

        Ok(PipelineStatus {
            running: self.is_running(),
            pending_count: count(JobStatus::Pending)?,
            processing_count: count(JobStatus::Processing)?,
            pending_retry_count: count(JobStatus::PendingRetry)?,
            complete_count: count(JobStatus::Complete)?,
            error_count: count(JobStatus::Error)?,
            last_run: self.batch.last_report().await,
        })
    }

    /// Run one batch now.
    pub async fn trigger(&self) -> BatchReport {
        info!("Manual batch run triggered");
        self.batch.run_once().await
    }

    /// Explicitly enqueue a content item.
    pub fn enqueue(&self, content_id: &str) -> Result<Job, ScanError> {
        self.scanner.enqueue(content_id)
    }

    fn spawn_poll_loop(&self) -> JoinHandle<()> {
        let running = Arc::clone(&self.running);
        let batch = Arc::clone(&self.batch);
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Poll loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Poll loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        batch.run_once().await;
                    }
                }
            }
            info!("Poll loop stopped");
        })
    }
}
