//! Configuration for the generator module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the HTTP text-to-speech client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Base URL of the TTS service (e.g. "http://localhost:5002").
    #[serde(default = "default_url")]
    pub url: String,

    /// Optional bearer token for the TTS service.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Voice identifier passed to the service.
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Audio format requested from the service; also the file extension.
    #[serde(default = "default_format")]
    pub format: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Directory narration files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_url() -> String {
    "http://localhost:5002".to_string()
}

fn default_voice() -> String {
    "calm-female-1".to_string()
}

fn default_format() -> String {
    "mp3".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("media/narration")
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: None,
            voice: default_voice(),
            format: default_format(),
            timeout_secs: default_timeout(),
            output_dir: default_output_dir(),
        }
    }
}
