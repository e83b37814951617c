//! FFmpeg-based mixer implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::MixerConfig;
use super::error::MixError;
use super::traits::Mixer;
use super::types::MixRequest;
use crate::content::AudioRef;

/// Upper bound for a linear gain; anything louder clips badly.
pub const MAX_GAIN: f32 = 4.0;

/// FFmpeg-based mixer implementation.
pub struct FfmpegMixer {
    config: MixerConfig,
}

impl FfmpegMixer {
    /// Creates a new FFmpeg mixer with the given configuration.
    pub fn new(config: MixerConfig) -> Self {
        Self { config }
    }

    /// Creates a mixer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MixerConfig::default())
    }

    fn check_gain(gain: f32) -> Result<(), MixError> {
        if gain.is_finite() && (0.0..=MAX_GAIN).contains(&gain) {
            Ok(())
        } else {
            Err(MixError::InvalidGain { gain })
        }
    }

    async fn check_input(path: &Path) -> Result<(), MixError> {
        match tokio::fs::try_exists(path).await {
            Ok(true) => Ok(()),
            _ => Err(MixError::InputNotFound {
                path: path.to_path_buf(),
            }),
        }
    }

    fn output_path(&self) -> PathBuf {
        self.config
            .output_dir
            .join(format!("mix-{}.mp3", uuid::Uuid::new_v4()))
    }

    /// Builds ffmpeg arguments for a narration-over-ambient mix.
    ///
    /// The ambient input is looped and the output ends with the narration.
    fn build_args(&self, request: &MixRequest, output_path: &Path) -> Vec<String> {
        let filter = format!(
            "[0:a]volume={:.2}[narr];[1:a]volume={:.2}[amb];[narr][amb]amix=inputs=2:duration=first:dropout_transition=0:normalize=0[out]",
            request.narration_gain, request.ambient_gain
        );

        vec![
            "-y".to_string(),
            "-i".to_string(),
            request.narration.as_str().to_string(),
            "-stream_loop".to_string(),
            "-1".to_string(),
            "-i".to_string(),
            request.ambient.as_str().to_string(),
            "-filter_complex".to_string(),
            filter,
            "-map".to_string(),
            "[out]".to_string(),
            "-c:a".to_string(),
            "libmp3lame".to_string(),
            "-b:a".to_string(),
            format!("{}k", self.config.bitrate_kbps),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            output_path.to_string_lossy().to_string(),
        ]
    }

    fn spawn_error(&self, e: std::io::Error) -> MixError {
        if e.kind() == std::io::ErrorKind::NotFound {
            MixError::FfmpegNotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            MixError::Io(e)
        }
    }
}

#[async_trait]
impl Mixer for FfmpegMixer {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn mix(&self, request: MixRequest) -> Result<AudioRef, MixError> {
        let start = Instant::now();

        Self::check_gain(request.narration_gain)?;
        Self::check_gain(request.ambient_gain)?;
        Self::check_input(request.narration.as_path()).await?;
        Self::check_input(request.ambient.as_path()).await?;

        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|_| MixError::OutputDirectoryFailed {
                path: self.config.output_dir.clone(),
            })?;

        let output_path = self.output_path();
        let args = self.build_args(&request, &output_path);

        let child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                // Dropping the future drops the child, which kills it.
                return Err(MixError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(MixError::mix_failed(
                format!("FFmpeg exited with code: {:?}", output.status.code()),
                if stderr.is_empty() { None } else { Some(stderr) },
            ));
        }

        if !tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
            return Err(MixError::mix_failed("Output file not created", None));
        }

        debug!(
            "Mixed {} over {} into {:?} in {} ms",
            request.narration,
            request.ambient,
            output_path,
            start.elapsed().as_millis()
        );

        AudioRef::from_path(&output_path).map_err(|e| MixError::mix_failed(e.to_string(), None))
    }

    async fn validate(&self) -> Result<(), MixError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if output.success() {
            Ok(())
        } else {
            Err(MixError::mix_failed("ffmpeg -version failed", None))
        }
    }
}
