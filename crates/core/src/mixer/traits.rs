//! Trait definitions for the mixer module.

use async_trait::async_trait;

use super::error::MixError;
use super::types::MixRequest;
use crate::content::AudioRef;

/// Combines narration with an ambient track.
#[async_trait]
pub trait Mixer: Send + Sync {
    /// Returns the name of this mixer implementation.
    fn name(&self) -> &str;

    /// Mixes the request's inputs and returns a reference to the final asset.
    async fn mix(&self, request: MixRequest) -> Result<AudioRef, MixError>;

    /// Validates that the mixer is properly configured and ready.
    async fn validate(&self) -> Result<(), MixError> {
        Ok(())
    }
}
