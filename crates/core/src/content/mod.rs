//! Content items that eventually carry a finished, playable audio asset.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteContentStore;
pub use store::{ContentError, ContentFilter, ContentStore, ContentUpdate, NewContent};
pub use types::{AudioRef, ContentItem, ContentStatus, EmptyAudioRef};
