//! Mock narration generator for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::content::AudioRef;
use crate::generator::{GenerationError, NarrationGenerator};

/// Mock implementation of the NarrationGenerator trait.
///
/// Clones share state, so a test can keep one handle and hand another to
/// the dispatcher.
///
/// # Example
///
/// ```rust,ignore
/// use meditone_core::testing::MockGenerator;
///
/// let generator = MockGenerator::new();
/// generator.set_next_error(GenerationError::EmptyAudio).await;
///
/// // ... run the dispatcher ...
///
/// assert_eq!(generator.recorded_scripts().await.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    /// Scripts passed to `generate`, in call order.
    scripts: Arc<RwLock<Vec<String>>>,
    /// If set, the next call fails with this error.
    next_error: Arc<RwLock<Option<GenerationError>>>,
    /// If set, every call fails with a transport error carrying this message.
    always_fail: Arc<RwLock<Option<String>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all scripts submitted so far.
    pub async fn recorded_scripts(&self) -> Vec<String> {
        self.scripts.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.scripts.read().await.len()
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: GenerationError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every call fail (retryably) until cleared with `None`.
    pub async fn set_always_fail(&self, message: Option<&str>) {
        *self.always_fail.write().await = message.map(str::to_string);
    }
}

#[async_trait]
impl NarrationGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, script: &str) -> Result<AudioRef, GenerationError> {
        let call = {
            let mut scripts = self.scripts.write().await;
            scripts.push(script.to_string());
            scripts.len()
        };

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if let Some(message) = self.always_fail.read().await.as_ref() {
            return Err(GenerationError::Http(message.clone()));
        }

        AudioRef::try_from(format!("/mock/narration/narration-{}.mp3", call))
            .map_err(|e| GenerationError::Failed(e.to_string()))
    }
}
