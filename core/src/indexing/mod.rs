//! Incremental indexing: full passes through a bounded dispatch window plus
//! live per-document updates.

pub mod events;
pub mod service;
pub mod window;

pub use events::{IndexingEvent, IndexingStatus, IndexingSummary};
pub use service::IndexingService;
pub use window::DispatchWindow;
