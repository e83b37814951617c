//! Narration generation (text-to-speech).
//!
//! The pipeline only needs a script → audio reference step; the synthesis
//! itself happens in an external TTS service reached over HTTP.

mod config;
mod error;
mod http;
mod traits;

pub use config::GeneratorConfig;
pub use error::GenerationError;
pub use http::HttpNarrationGenerator;
pub use traits::NarrationGenerator;
