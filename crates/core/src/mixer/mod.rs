//! Mixer module for combining narration with an ambient bed.
//!
//! This module provides the `Mixer` trait and an FFmpeg-based implementation.
//!
//! # Example
//!
//! ```ignore
//! use meditone_core::mixer::{FfmpegMixer, Mixer, MixRequest};
//!
//! let mixer = FfmpegMixer::with_defaults();
//! mixer.validate().await?;
//!
//! let request = MixRequest {
//!     narration: AudioRef::try_from("/media/narration/a.mp3")?,
//!     ambient: AudioRef::try_from("/media/ambient/rain.mp3")?,
//!     narration_gain: 1.0,
//!     ambient_gain: 0.35,
//! };
//! let final_audio = mixer.mix(request).await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::MixerConfig;
pub use error::MixError;
pub use ffmpeg::{FfmpegMixer, MAX_GAIN};
pub use traits::Mixer;
pub use types::MixRequest;
