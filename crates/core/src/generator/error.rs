//! Error types for the generator module.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during narration synthesis.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Nothing to synthesize.
    #[error("Narration script is empty")]
    EmptyScript,

    /// Transport-level failure talking to the TTS service.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The TTS service answered with a non-success status.
    #[error("TTS service error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The request took longer than the configured timeout.
    #[error("TTS request timed out after {0:?}")]
    Timeout(Duration),

    /// The service returned no audio data.
    #[error("TTS service returned no audio")]
    EmptyAudio,

    /// Output directory does not exist and could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirectoryFailed { path: PathBuf },

    /// I/O error while storing the narration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Synthesis failed for another reason.
    #[error("Synthesis failed: {0}")]
    Failed(String),
}

impl GenerationError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) | Self::Io(_) | Self::EmptyAudio => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::EmptyScript | Self::OutputDirectoryFailed { .. } | Self::Failed(_) => false,
        }
    }
}
