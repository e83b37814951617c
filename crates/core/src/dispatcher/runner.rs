//! Job dispatcher implementation.
//!
//! One `process_next` call is a linear sequence of awaited steps:
//! select, claim, load content, generate, mix, finalize. Faults in the
//! middle of that sequence are recorded against the claimed job and never
//! escape as errors; only job-store outages do.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::content::{AudioRef, ContentStatus, ContentStore, ContentUpdate};
use crate::generator::NarrationGenerator;
use crate::job::{Job, JobFilter, JobStatus, JobStore, JobTransition};
use crate::metrics;
use crate::mixer::{MixRequest, Mixer};

use super::policy::DispatcherConfig;
use super::types::{DispatchError, DispatchOutcome, JobFault};

/// Stored on jobs that startup recovery had to abandon.
pub(crate) const INTERRUPTED_MESSAGE: &str = "interrupted before completion";

const RECOVERY_LIMIT: i64 = 1000;

/// Drives a single job from pending to a resting state.
pub struct JobDispatcher {
    config: DispatcherConfig,
    job_store: Arc<dyn JobStore>,
    content_store: Arc<dyn ContentStore>,
    generator: Arc<dyn NarrationGenerator>,
    mixer: Arc<dyn Mixer>,
}

impl JobDispatcher {
    pub fn new(
        config: DispatcherConfig,
        job_store: Arc<dyn JobStore>,
        content_store: Arc<dyn ContentStore>,
        generator: Arc<dyn NarrationGenerator>,
        mixer: Arc<dyn Mixer>,
    ) -> Self {
        Self {
            config,
            job_store,
            content_store,
            generator,
            mixer,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Process the oldest claimable job, if any.
    ///
    /// Returns `Err` only for systemic faults: the job store could not be
    /// queried, the claim failed, the final `complete` write failed, or a
    /// failed job could not be recorded as such.
    pub async fn process_next(&self) -> Result<DispatchOutcome, DispatchError> {
        let candidate = match self.next_candidate()? {
            Some(job) => job,
            None => {
                debug!("No claimable jobs");
                return Ok(DispatchOutcome::Idle);
            }
        };

        let job = match self.job_store.claim(&candidate.id)? {
            Some(job) => job,
            None => {
                debug!("Job {} was claimed elsewhere", candidate.id);
                return Ok(DispatchOutcome::ClaimLost {
                    job_id: candidate.id,
                });
            }
        };

        info!(
            "Processing job {} for content {} (attempt {})",
            job.id, job.content_id, job.attempts
        );

        let started = Instant::now();
        let outcome = match self.run_job(&job).await {
            Ok(final_audio) => self.finish_job(&job, final_audio)?,
            Err(fault) => self.handle_fault(&job, fault)?,
        };

        let result = match &outcome {
            DispatchOutcome::Completed { .. } => "complete",
            DispatchOutcome::RetryScheduled { .. } => "retry",
            _ => "error",
        };
        metrics::JOBS_PROCESSED.with_label_values(&[result]).inc();
        metrics::JOB_DURATION
            .with_label_values(&[result])
            .observe(started.elapsed().as_secs_f64());

        Ok(outcome)
    }

    /// Pending jobs first; due retries only once nothing fresh is waiting.
    fn next_candidate(&self) -> Result<Option<Job>, DispatchError> {
        let pending = self
            .job_store
            .list(&JobFilter::new().with_status(JobStatus::Pending).with_limit(1))?;
        if let Some(job) = pending.into_iter().next() {
            return Ok(Some(job));
        }

        if !self.config.retry.is_enabled() {
            return Ok(None);
        }

        let due = self.job_store.list(
            &JobFilter::new()
                .with_status(JobStatus::PendingRetry)
                .due_at(Utc::now())
                .with_limit(1),
        )?;
        Ok(due.into_iter().next())
    }

    /// Steps from loading the content item up to marking it ready.
    async fn run_job(&self, job: &Job) -> Result<AudioRef, JobFault> {
        let item = self
            .content_store
            .get(&job.content_id)?
            .ok_or_else(|| JobFault::ContentMissing(job.content_id.clone()))?;

        self.content_store
            .update(&item.id, ContentUpdate::Generating)?;

        let started = Instant::now();
        let narration = match self.generator.generate(&item.script).await {
            Ok(narration) => {
                metrics::GENERATION_DURATION
                    .with_label_values(&["success"])
                    .observe(started.elapsed().as_secs_f64());
                narration
            }
            Err(e) => {
                metrics::GENERATION_DURATION
                    .with_label_values(&["failed"])
                    .observe(started.elapsed().as_secs_f64());
                return Err(e.into());
            }
        };
        debug!("Job {}: narration at {}", job.id, narration);

        let ambient = self
            .config
            .mix
            .ambient_for(item.ambient_track.as_ref())
            .ok_or(JobFault::NoAmbientTrack)?;

        let request = MixRequest {
            narration,
            ambient,
            narration_gain: self.config.mix.narration_gain,
            ambient_gain: self.config.mix.ambient_gain,
        };

        let started = Instant::now();
        let final_audio = match self.mixer.mix(request).await {
            Ok(final_audio) => {
                metrics::MIXING_DURATION
                    .with_label_values(&["success"])
                    .observe(started.elapsed().as_secs_f64());
                final_audio
            }
            Err(e) => {
                metrics::MIXING_DURATION
                    .with_label_values(&["failed"])
                    .observe(started.elapsed().as_secs_f64());
                return Err(e.into());
            }
        };

        self.content_store.update(
            &item.id,
            ContentUpdate::Ready {
                final_audio: final_audio.clone(),
            },
        )?;

        Ok(final_audio)
    }

    fn finish_job(&self, job: &Job, final_audio: AudioRef) -> Result<DispatchOutcome, DispatchError> {
        if let Err(e) = self.job_store.transition(&job.id, JobTransition::Complete) {
            error!(
                "Content {} is ready but job {} could not be completed: {}",
                job.content_id, job.id, e
            );
            return Err(e.into());
        }

        info!("Job {} complete: {}", job.id, final_audio);

        Ok(DispatchOutcome::Completed {
            job_id: job.id.clone(),
            content_id: job.content_id.clone(),
            final_audio,
        })
    }

    /// Record a per-job fault against the claimed job.
    fn handle_fault(&self, job: &Job, fault: JobFault) -> Result<DispatchOutcome, DispatchError> {
        let message = fault.to_string();

        let retry_at = (fault.is_retryable() && self.config.retry.allows_retry(job.attempts))
            .then(|| Utc::now().checked_add_signed(self.config.retry.backoff(job.attempts)))
            .flatten();

        if let Some(next_attempt_at) = retry_at {

            warn!(
                "Job {} failed (attempt {}), retrying at {}: {}",
                job.id, job.attempts, next_attempt_at, message
            );

            self.job_store
                .transition(
                    &job.id,
                    JobTransition::Retry {
                        error: message.clone(),
                        next_attempt_at,
                    },
                )
                .map_err(|e| recovery_error(job, e))?;
            self.content_store
                .update(&job.content_id, ContentUpdate::Pending)
                .map_err(|e| recovery_error(job, e))?;

            return Ok(DispatchOutcome::RetryScheduled {
                job_id: job.id.clone(),
                content_id: job.content_id.clone(),
                error: message,
                next_attempt_at,
            });
        }

        error!("Job {} failed: {}", job.id, message);

        // Attempt both writes before reporting either failure.
        let job_result = self.job_store.transition(
            &job.id,
            JobTransition::Fail {
                error: message.clone(),
            },
        );
        let content_result = if fault.content_exists() {
            self.content_store
                .update(&job.content_id, ContentUpdate::Error)
                .map(|_| ())
        } else {
            Ok(())
        };

        if let Err(e) = job_result {
            error!("Failed to mark job {} as error: {}", job.id, e);
            return Err(recovery_error(job, e));
        }
        if let Err(e) = content_result {
            error!("Failed to mark content {} as error: {}", job.content_id, e);
            return Err(recovery_error(job, e));
        }

        Ok(DispatchOutcome::Failed {
            job_id: job.id.clone(),
            content_id: job.content_id.clone(),
            error: message,
        })
    }

    /// Resolve jobs left in `processing` by a previous run.
    ///
    /// Jobs whose content already reached `ready` are completed; all others
    /// are marked failed. Returns the number of jobs resolved.
    pub async fn recover_interrupted(&self) -> Result<usize, DispatchError> {
        let stale = self.job_store.list(
            &JobFilter::new()
                .with_status(JobStatus::Processing)
                .with_limit(RECOVERY_LIMIT),
        )?;

        if stale.is_empty() {
            return Ok(0);
        }

        info!("Recovering {} interrupted job(s)", stale.len());

        for job in &stale {
            let item = self
                .content_store
                .get(&job.content_id)
                .map_err(|e| recovery_error(job, e))?;

            match item {
                Some(item) if item.status == ContentStatus::Ready => {
                    self.job_store.transition(&job.id, JobTransition::Complete)?;
                    info!("Recovered job {}: content {} already ready", job.id, item.id);
                }
                Some(item) => {
                    self.job_store.transition(
                        &job.id,
                        JobTransition::Fail {
                            error: INTERRUPTED_MESSAGE.to_string(),
                        },
                    )?;
                    self.content_store
                        .update(&item.id, ContentUpdate::Error)
                        .map_err(|e| recovery_error(job, e))?;
                    warn!("Job {} was interrupted, marked as error", job.id);
                }
                None => {
                    self.job_store.transition(
                        &job.id,
                        JobTransition::Fail {
                            error: INTERRUPTED_MESSAGE.to_string(),
                        },
                    )?;
                    warn!(
                        "Job {} was interrupted and its content {} is gone",
                        job.id, job.content_id
                    );
                }
            }
        }

        Ok(stale.len())
    }
}

fn recovery_error(job: &Job, e: impl std::fmt::Display) -> DispatchError {
    DispatchError::Recovery {
        job_id: job.id.clone(),
        reason: e.to_string(),
    }
}
