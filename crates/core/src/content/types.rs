//! Content item types.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to an audio asset (a file path for the bundled services).
///
/// Never empty: construction goes through [`TryFrom<String>`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AudioRef(String);

/// Returned when an audio reference would be blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("audio reference cannot be empty")]
pub struct EmptyAudioRef;

impl AudioRef {
    /// Build a reference pointing at a local file.
    pub fn from_path(path: &Path) -> Result<Self, EmptyAudioRef> {
        Self::try_from(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl TryFrom<String> for AudioRef {
    type Error = EmptyAudioRef;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            Err(EmptyAudioRef)
        } else {
            Ok(Self(value))
        }
    }
}

impl TryFrom<&str> for AudioRef {
    type Error = EmptyAudioRef;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

impl From<AudioRef> for String {
    fn from(value: AudioRef) -> Self {
        value.0
    }
}

impl fmt::Display for AudioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generation status of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    /// Untouched by the pipeline.
    Pending,
    /// A job is currently producing audio for this item.
    Generating,
    /// Final audio is available.
    Ready,
    /// The last generation attempt failed.
    Error,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Pending => "pending",
            ContentStatus::Generating => "generating",
            ContentStatus::Ready => "ready",
            ContentStatus::Error => "error",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ContentStatus::Pending),
            "generating" => Ok(ContentStatus::Generating),
            "ready" => Ok(ContentStatus::Ready),
            "error" => Ok(ContentStatus::Error),
            other => Err(format!("unknown content status: {}", other)),
        }
    }
}

/// A guided-content record whose narration gets rendered to audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    /// Narration script fed to the generator.
    pub script: String,
    /// Background track; the configured default is used when absent.
    pub ambient_track: Option<AudioRef>,
    pub status: ContentStatus,
    /// Present if and only if `status` is `Ready`.
    pub final_audio: Option<AudioRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Whether the scanner should create a job for this item.
    pub fn needs_audio(&self) -> bool {
        self.status == ContentStatus::Pending && self.final_audio.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_ref_rejects_blank() {
        assert_eq!(AudioRef::try_from(""), Err(EmptyAudioRef));
        assert_eq!(AudioRef::try_from("   "), Err(EmptyAudioRef));
        assert_eq!(
            AudioRef::try_from("/media/a.mp3").unwrap().as_str(),
            "/media/a.mp3"
        );
    }

    #[test]
    fn test_audio_ref_deserialize_blank_fails() {
        let result: Result<AudioRef, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());

        let parsed: AudioRef = serde_json::from_str("\"/a.mp3\"").unwrap();
        assert_eq!(parsed.to_string(), "/a.mp3");
    }

    #[test]
    fn test_content_status_round_trip_str() {
        for status in [
            ContentStatus::Pending,
            ContentStatus::Generating,
            ContentStatus::Ready,
            ContentStatus::Error,
        ] {
            assert_eq!(status.as_str().parse::<ContentStatus>().unwrap(), status);
        }
        assert!("done".parse::<ContentStatus>().is_err());
    }

    #[test]
    fn test_needs_audio() {
        let now = Utc::now();
        let mut item = ContentItem {
            id: "c1".to_string(),
            script: "Breathe in".to_string(),
            ambient_track: None,
            status: ContentStatus::Pending,
            final_audio: None,
            created_at: now,
            updated_at: now,
        };
        assert!(item.needs_audio());

        item.status = ContentStatus::Error;
        assert!(!item.needs_audio());
    }
}
