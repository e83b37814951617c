//! HTTP text-to-speech client.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::config::GeneratorConfig;
use super::error::GenerationError;
use super::traits::NarrationGenerator;
use crate::content::AudioRef;

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    voice: &'a str,
    format: &'a str,
}

/// Generator backed by a TTS service exposing `POST /synthesize`.
///
/// The service answers with raw audio bytes, which are written to
/// `output_dir` and returned as a file reference.
pub struct HttpNarrationGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl HttpNarrationGenerator {
    /// Create a new generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/synthesize", self.config.url.trim_end_matches('/'))
    }

    fn output_path(&self) -> PathBuf {
        self.config.output_dir.join(format!(
            "narration-{}.{}",
            uuid::Uuid::new_v4(),
            self.config.format
        ))
    }

    fn map_send_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout(Duration::from_secs(self.config.timeout_secs))
        } else {
            GenerationError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl NarrationGenerator for HttpNarrationGenerator {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate(&self, script: &str) -> Result<AudioRef, GenerationError> {
        if script.trim().is_empty() {
            return Err(GenerationError::EmptyScript);
        }

        let body = SynthesizeRequest {
            text: script,
            voice: &self.config.voice,
            format: &self.config.format,
        };

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(ref api_key) = self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let audio = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        if audio.is_empty() {
            return Err(GenerationError::EmptyAudio);
        }

        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|_| GenerationError::OutputDirectoryFailed {
                path: self.config.output_dir.clone(),
            })?;

        let path = self.output_path();
        tokio::fs::write(&path, &audio).await?;
        debug!("Wrote {} bytes of narration to {:?}", audio.len(), path);

        AudioRef::from_path(&path).map_err(|e| GenerationError::Failed(e.to_string()))
    }
}
