//! Store wrappers that inject faults.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::job::{CreateJobRequest, Job, JobError, JobFilter, JobStore, JobTransition};

/// Wraps a job store and fails selected operations on demand.
///
/// Used to exercise the systemic-fault paths of the dispatcher and the
/// batch runner.
#[derive(Clone)]
pub struct FaultyJobStore {
    inner: Arc<dyn JobStore>,
    fail_reads: Arc<AtomicBool>,
    fail_transitions: Arc<AtomicBool>,
    claim_elsewhere: Arc<AtomicBool>,
}

impl FaultyJobStore {
    pub fn new(inner: Arc<dyn JobStore>) -> Self {
        Self {
            inner,
            fail_reads: Arc::new(AtomicBool::new(false)),
            fail_transitions: Arc::new(AtomicBool::new(false)),
            claim_elsewhere: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fail `get`, `list` and `count`.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Fail `transition`.
    pub fn fail_transitions(&self, fail: bool) {
        self.fail_transitions.store(fail, Ordering::SeqCst);
    }

    /// Have a competing worker claim each job right before we do.
    pub fn claim_elsewhere_before_claim(&self, enabled: bool) {
        self.claim_elsewhere.store(enabled, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> Result<(), JobError> {
        if flag.load(Ordering::SeqCst) {
            return Err(JobError::Database("injected fault".to_string()));
        }
        Ok(())
    }
}

impl JobStore for FaultyJobStore {
    fn create(&self, request: CreateJobRequest) -> Result<Job, JobError> {
        self.inner.create(request)
    }

    fn get(&self, id: &str) -> Result<Option<Job>, JobError> {
        Self::check(&self.fail_reads)?;
        self.inner.get(id)
    }

    fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, JobError> {
        Self::check(&self.fail_reads)?;
        self.inner.list(filter)
    }

    fn count(&self, filter: &JobFilter) -> Result<i64, JobError> {
        Self::check(&self.fail_reads)?;
        self.inner.count(filter)
    }

    fn claim(&self, id: &str) -> Result<Option<Job>, JobError> {
        if self.claim_elsewhere.load(Ordering::SeqCst) {
            self.inner.claim(id)?;
        }
        self.inner.claim(id)
    }

    fn transition(&self, id: &str, transition: JobTransition) -> Result<Job, JobError> {
        Self::check(&self.fail_transitions)?;
        self.inner.transition(id, transition)
    }
}
