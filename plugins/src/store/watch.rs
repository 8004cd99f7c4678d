use std::path::Path;
use std::sync::Arc;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use tasktrack_core::error::StoreError;
use tasktrack_core::store::DocumentEvent;

use super::fs::FsDocumentStore;

/// Translate one filesystem notification into document events.
pub fn document_events(store: &FsDocumentStore, event: &notify::Event) -> Vec<DocumentEvent> {
    event
        .paths
        .iter()
        .filter(|path| store.is_document(path))
        .filter_map(|path| {
            let name = store.relative_name(path)?;
            match event.kind {
                EventKind::Create(_) => Some(DocumentEvent::Created(name)),
                EventKind::Modify(_) if path.exists() => Some(DocumentEvent::Modified(name)),
                EventKind::Modify(_) | EventKind::Remove(_) => Some(DocumentEvent::Deleted(name)),
                _ => None,
            }
        })
        .collect()
}

/// Keeps a filesystem watcher alive and forwards its changes to the store's
/// subscribers. Dropping it stops watching.
pub struct DocumentWatcher {
    _watcher: RecommendedWatcher,
}

impl DocumentWatcher {
    pub fn start(store: Arc<FsDocumentStore>) -> Result<Self, StoreError> {
        let root = store.root().to_path_buf();
        let handler_store = store.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    for change in document_events(&handler_store, &event) {
                        tracing::debug!(?change, "document change observed");
                        handler_store.notify(change);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "file watcher error"),
            }
        })
        .map_err(|e| watch_error(&root, e))?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| watch_error(&root, e))?;
        tracing::info!(root = %root.display(), "watching documents");

        Ok(Self { _watcher: watcher })
    }
}

fn watch_error(root: &Path, e: notify::Error) -> StoreError {
    StoreError::Backend(format!("cannot watch {}: {e}", root.display()))
}
