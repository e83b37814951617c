//! Trait definitions for the generator module.

use async_trait::async_trait;

use super::error::GenerationError;
use crate::content::AudioRef;

/// Turns a narration script into an audio asset.
#[async_trait]
pub trait NarrationGenerator: Send + Sync {
    /// Returns the name of this generator implementation.
    fn name(&self) -> &str;

    /// Synthesizes `script` and returns a reference to the narration audio.
    async fn generate(&self, script: &str) -> Result<AudioRef, GenerationError>;
}
