//! Pipeline orchestrator.
//!
//! Runs the batch runner periodically in the background, and on demand.

mod batch;
mod config;
mod runner;
mod types;

pub use batch::BatchRunner;
pub use config::PipelineConfig;
pub use runner::PipelineOrchestrator;
pub use types::{BatchReport, PipelineStatus, StopReason};
