//! Document stores backed by the local filesystem.

pub mod fs;
pub mod watch;

pub use fs::FsDocumentStore;
pub use watch::{document_events, DocumentWatcher};
