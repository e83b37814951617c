//! Configuration for the mixer module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the FFmpeg-based mixer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixerConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Directory final mixes are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Timeout for a single mix in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Output MP3 bitrate.
    #[serde(default = "default_bitrate")]
    pub bitrate_kbps: u32,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("media/final")
}

fn default_timeout() -> u64 {
    600 // 10 minutes
}

fn default_bitrate() -> u32 {
    192
}

fn default_log_level() -> String {
    "warning".to_string()
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            output_dir: default_output_dir(),
            timeout_secs: default_timeout(),
            bitrate_kbps: default_bitrate(),
            ffmpeg_log_level: default_log_level(),
        }
    }
}
