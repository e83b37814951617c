//! Testing utilities and mock implementations.
//!
//! Mocks for the two external services plus a fault-injecting job store,
//! so the whole pipeline can run against in-memory SQLite without a TTS
//! service or ffmpeg.
//!
//! # Example
//!
//! ```rust,ignore
//! use meditone_core::testing::{MockGenerator, MockMixer};
//!
//! let generator = MockGenerator::new();
//! let mixer = MockMixer::new();
//!
//! generator.set_next_error(GenerationError::EmptyAudio).await;
//! ```

mod faulty_store;
mod mock_generator;
mod mock_mixer;

pub use faulty_store::FaultyJobStore;
pub use mock_generator::MockGenerator;
pub use mock_mixer::MockMixer;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;

    use crate::content::{ContentItem, ContentStore, NewContent, SqliteContentStore};
    use crate::job::SqliteJobStore;

    /// Fresh in-memory job and content stores.
    pub fn in_memory_stores() -> (Arc<SqliteJobStore>, Arc<SqliteContentStore>) {
        let jobs = SqliteJobStore::in_memory().expect("in-memory job store");
        let content = SqliteContentStore::in_memory().expect("in-memory content store");
        (Arc::new(jobs), Arc::new(content))
    }

    /// A short guided-meditation script.
    pub fn script(topic: &str) -> String {
        format!(
            "Settle into a comfortable position. Today we focus on {}. Breathe in slowly.",
            topic
        )
    }

    /// Insert a pending content item with the given ID.
    pub fn pending_content(store: &dyn ContentStore, id: &str) -> ContentItem {
        store
            .insert(NewContent::new(script(id)).with_id(id))
            .expect("insert content")
    }

    /// Insert `count` pending content items named `{prefix}-{n}`.
    pub fn pending_content_batch(store: &dyn ContentStore, prefix: &str, count: usize) -> Vec<ContentItem> {
        (1..=count)
            .map(|n| pending_content(store, &format!("{}-{:02}", prefix, n)))
            .collect()
    }
}
