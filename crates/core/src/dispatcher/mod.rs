//! Single-job dispatcher.
//!
//! Claims one pending job and drives it through narration synthesis,
//! mixing and status finalization, rolling back to `error` (or scheduling a
//! retry) when any step fails.

mod policy;
mod runner;
mod types;

pub use policy::{
    DispatcherConfig, MixPolicy, RetryPolicy, DEFAULT_AMBIENT_GAIN, DEFAULT_NARRATION_GAIN,
    MAX_RETRY_DELAY_SECS,
};
pub use runner::JobDispatcher;
pub use types::{DispatchError, DispatchOutcome, JobFault};
