pub mod config;
pub mod content;
mod db;
pub mod dispatcher;
pub mod generator;
pub mod job;
pub mod metrics;
pub mod mixer;
pub mod orchestrator;
pub mod scanner;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    SanitizedConfig, ServerConfig,
};
pub use content::{
    AudioRef, ContentError, ContentFilter, ContentItem, ContentStatus, ContentStore,
    ContentUpdate, NewContent, SqliteContentStore,
};
pub use dispatcher::{
    DispatchError, DispatchOutcome, DispatcherConfig, JobDispatcher, JobFault, MixPolicy,
    RetryPolicy,
};
pub use generator::{GenerationError, GeneratorConfig, HttpNarrationGenerator, NarrationGenerator};
pub use job::{
    CreateJobRequest, Job, JobError, JobFilter, JobStatus, JobStore, JobTransition, SqliteJobStore,
};
pub use mixer::{FfmpegMixer, MixError, MixRequest, Mixer, MixerConfig};
pub use orchestrator::{
    BatchReport, BatchRunner, PipelineConfig, PipelineOrchestrator, PipelineStatus, StopReason,
};
pub use scanner::{AutoEnqueueScanner, ScanError, ScanReport};
