//! Job queue for audio generation work.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteJobStore;
pub use store::{CreateJobRequest, JobError, JobFilter, JobStore, JobTransition};
pub use types::{Job, JobStatus};
