//! Error types for the mixer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while mixing.
#[derive(Debug, Error)]
pub enum MixError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// An input track does not exist.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Gain outside the accepted range.
    #[error("Invalid gain: {gain}")]
    InvalidGain { gain: f32 },

    /// Output directory does not exist and could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirectoryFailed { path: PathBuf },

    /// The mix process failed.
    #[error("Mix failed: {reason}")]
    MixFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Mixing timed out.
    #[error("Mix timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error during mixing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MixError {
    /// Creates a new mix failed error with stderr output.
    pub fn mix_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::MixFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Io(_) | Self::MixFailed { .. }
        )
    }
}
