use thiserror::Error;

use super::worker::WorkerError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum IndexingError {
    #[error("worker is not available: {0}")]
    WorkerUnavailable(WorkerError),

    #[error("failed to read {path}: {source}")]
    Read { path: String, source: StoreError },

    #[error("worker failed on {path}: {source}")]
    Dispatch { path: String, source: WorkerError },

    #[error("worker reported failure for {0}")]
    Rejected(String),

    #[error("document store failed: {0}")]
    Store(#[from] StoreError),
}
