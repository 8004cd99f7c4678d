use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::StoreError;

/// Edit applied inside [`DocumentStore::process`]: receives the current
/// content and returns the content to store.
pub type DocumentEdit = Box<dyn FnOnce(&str) -> String + Send>;

/// Change notification carrying the affected document path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "path", rename_all = "kebab-case")]
pub enum DocumentEvent {
    Created(String),
    Modified(String),
    Deleted(String),
}

impl DocumentEvent {
    pub fn path(&self) -> &str {
        match self {
            DocumentEvent::Created(path)
            | DocumentEvent::Modified(path)
            | DocumentEvent::Deleted(path) => path,
        }
    }
}

/// Source of Markdown documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of the indexed kind, as store-relative paths.
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Current content of `path`. Implementations may serve it from a cache.
    async fn read(&self, path: &str) -> Result<String, StoreError>;

    /// Atomic read-modify-write. No other write to `path` may land between
    /// reading the content handed to `edit` and storing its result.
    /// Returns the stored content.
    async fn process(&self, path: &str, edit: DocumentEdit) -> Result<String, StoreError>;

    fn subscribe(&self) -> broadcast::Receiver<DocumentEvent>;
}
