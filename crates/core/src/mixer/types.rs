//! Types for the mixer module.

use serde::{Deserialize, Serialize};

use crate::content::AudioRef;

/// Inputs for one mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixRequest {
    /// Foreground narration track; its length sets the output length.
    pub narration: AudioRef,
    /// Background track, looped under the narration.
    pub ambient: AudioRef,
    /// Linear gain applied to the narration.
    pub narration_gain: f32,
    /// Linear gain applied to the ambient track.
    pub ambient_gain: f32,
}
