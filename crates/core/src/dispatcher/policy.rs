//! Mixing and retry policies.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::content::AudioRef;

/// Narration is left at unity gain.
pub const DEFAULT_NARRATION_GAIN: f32 = 1.0;

/// Ambient bed sits well under the voice.
pub const DEFAULT_AMBIENT_GAIN: f32 = 0.35;

/// Upper bound for any single retry delay (30 days).
pub const MAX_RETRY_DELAY_SECS: u64 = 30 * 24 * 60 * 60;

/// Gain levels and fallback track used for every mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixPolicy {
    #[serde(default = "default_narration_gain")]
    pub narration_gain: f32,

    #[serde(default = "default_ambient_gain")]
    pub ambient_gain: f32,

    /// Used when a content item has no ambient track of its own.
    #[serde(default = "default_ambient_track")]
    pub default_ambient_track: String,
}

fn default_narration_gain() -> f32 {
    DEFAULT_NARRATION_GAIN
}

fn default_ambient_gain() -> f32 {
    DEFAULT_AMBIENT_GAIN
}

fn default_ambient_track() -> String {
    "media/ambient/default.mp3".to_string()
}

impl Default for MixPolicy {
    fn default() -> Self {
        Self {
            narration_gain: default_narration_gain(),
            ambient_gain: default_ambient_gain(),
            default_ambient_track: default_ambient_track(),
        }
    }
}

impl MixPolicy {
    /// The item's own track, or the configured default.
    pub fn ambient_for(&self, track: Option<&AudioRef>) -> Option<AudioRef> {
        match track {
            Some(track) => Some(track.clone()),
            None => AudioRef::try_from(self.default_ambient_track.as_str()).ok(),
        }
    }
}

/// Bounded retry with exponential backoff.
///
/// `max_retries = 0` disables retries: every failure is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

impl RetryPolicy {
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            base_delay_secs: 60,
            max_delay_secs: 3600,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Whether a job that has been claimed `attempts` times may try again.
    pub fn allows_retry(&self, attempts: u32) -> bool {
        attempts <= self.max_retries
    }

    /// Delay before the next attempt after `attempts` claims.
    pub fn backoff(&self, attempts: u32) -> Duration {
        let exponent = attempts.saturating_sub(1).min(20);
        let delay = self
            .base_delay_secs
            .saturating_mul(1u64 << exponent)
            .min(self.max_delay_secs)
            .min(MAX_RETRY_DELAY_SECS);
        Duration::try_seconds(delay as i64).unwrap_or_else(Duration::zero)
    }
}

/// Everything the dispatcher needs besides its collaborators.
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    pub mix: MixPolicy,
    pub retry: RetryPolicy,
}
