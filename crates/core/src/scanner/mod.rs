//! Auto-enqueue scanner.
//!
//! Sweeps content items that still need audio and makes sure each has
//! exactly one active job.

mod scan;
mod types;

pub use scan::AutoEnqueueScanner;
pub use types::{ScanError, ScanReport};
