//! Content storage trait and types.

use thiserror::Error;

use super::{AudioRef, ContentItem, ContentStatus};

/// Error type for content operations.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Content item not found.
    #[error("content item not found: {0}")]
    NotFound(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

/// A content item handed over by an upstream producer.
#[derive(Debug, Clone)]
pub struct NewContent {
    /// Explicit identity; a UUID is generated when absent.
    pub id: Option<String>,
    pub script: String,
    pub ambient_track: Option<AudioRef>,
}

impl NewContent {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            id: None,
            script: script.into(),
            ambient_track: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_ambient_track(mut self, track: AudioRef) -> Self {
        self.ambient_track = Some(track);
        self
    }
}

/// Status changes the pipeline may apply to a content item.
///
/// `final_audio` is only ever written together with `Ready`; every other
/// variant clears it.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentUpdate {
    Pending,
    Generating,
    Ready { final_audio: AudioRef },
    Error,
}

impl ContentUpdate {
    pub fn status(&self) -> ContentStatus {
        match self {
            ContentUpdate::Pending => ContentStatus::Pending,
            ContentUpdate::Generating => ContentStatus::Generating,
            ContentUpdate::Ready { .. } => ContentStatus::Ready,
            ContentUpdate::Error => ContentStatus::Error,
        }
    }

    pub fn final_audio(&self) -> Option<&AudioRef> {
        match self {
            ContentUpdate::Ready { final_audio } => Some(final_audio),
            _ => None,
        }
    }
}

/// Filter for querying content items.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    /// Filter by status.
    pub status: Option<ContentStatus>,
    /// Only items without a final audio reference.
    pub missing_final_audio: bool,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl ContentFilter {
    /// Create a new filter with defaults.
    pub fn new() -> Self {
        Self {
            status: None,
            missing_final_audio: false,
            limit: 100,
            offset: 0,
        }
    }

    /// Items the auto-enqueue scanner cares about.
    pub fn awaiting_audio() -> Self {
        Self::new()
            .with_status(ContentStatus::Pending)
            .without_final_audio()
    }

    pub fn with_status(mut self, status: ContentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn without_final_audio(mut self) -> Self {
        self.missing_final_audio = true;
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Trait for content storage backends.
pub trait ContentStore: Send + Sync {
    /// Insert a new content item in `pending` status.
    fn insert(&self, content: NewContent) -> Result<ContentItem, ContentError>;

    /// Get a content item by ID.
    fn get(&self, id: &str) -> Result<Option<ContentItem>, ContentError>;

    /// List content items matching the filter, oldest first.
    fn list(&self, filter: &ContentFilter) -> Result<Vec<ContentItem>, ContentError>;

    /// Apply a status update.
    fn update(&self, id: &str, update: ContentUpdate) -> Result<ContentItem, ContentError>;
}
