use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::broadcast;

use tasktrack_core::error::StoreError;
use tasktrack_core::store::{DocumentEdit, DocumentEvent, DocumentStore};

/// Markdown documents under one directory, addressed by `/`-separated paths
/// relative to that directory.
pub struct FsDocumentStore {
    root: PathBuf,
    extensions: Vec<String>,
    cache: Mutex<LruCache<String, Arc<str>>>,
    /// Serializes read-modify-write cycles per document.
    write_locks: tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    events: broadcast::Sender<DocumentEvent>,
}

impl FsDocumentStore {
    pub fn new(
        root: impl Into<PathBuf>,
        extensions: Vec<String>,
        cache_size: usize,
        event_capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            root: root.into(),
            extensions,
            cache: Mutex::new(LruCache::new(capacity)),
            write_locks: tokio::sync::Mutex::new(HashMap::new()),
            events,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` has one of the indexed extensions.
    pub fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Store-relative name of an absolute path under the root.
    pub fn relative_name(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let rel = Path::new(path);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(StoreError::Backend(format!(
                "path {path:?} is not inside the document root"
            )));
        }
        Ok(self.root.join(rel))
    }

    fn cached(&self, path: &str) -> Option<Arc<str>> {
        self.cache.lock().ok()?.get(path).cloned()
    }

    fn remember(&self, path: &str, content: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(path.to_string(), Arc::from(content));
        }
    }

    /// Drop any cached content for `path`.
    pub fn invalidate(&self, path: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.pop(path);
        }
    }

    /// Publish a change observed outside of [`DocumentStore::process`].
    pub fn notify(&self, event: DocumentEvent) {
        self.invalidate(event.path());
        let _ = self.events.send(event);
    }

    async fn write_lock(&self, path: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.write_locks
            .lock()
            .await
            .entry(path.to_string())
            .or_default()
            .clone()
    }

    async fn read_fresh(&self, path: &str) -> Result<String, StoreError> {
        let full = self.resolve(path)?;
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => StoreError::NotFound(path.to_string()),
                _ => StoreError::Io {
                    path: full.display().to_string(),
                    source,
                },
            })
    }

    /// Write through a sibling temp file so readers never see a torn file.
    async fn write_atomic(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let full = self.resolve(path)?;
        let tmp = full.with_extension("tasktrack.tmp");
        let io_err = |source: std::io::Error| StoreError::Io {
            path: full.display().to_string(),
            source,
        };
        tokio::fs::write(&tmp, content).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &full).await.map_err(io_err)
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut found = Vec::new();
        for ext in &self.extensions {
            let pattern = self.root.join("**").join(format!("*.{ext}"));
            let pattern_str = pattern.to_string_lossy().to_string();
            let paths = glob::glob(&pattern_str)
                .map_err(|e| StoreError::Backend(format!("bad pattern {pattern_str}: {e}")))?;
            for entry in paths {
                match entry {
                    Ok(path) if path.is_file() => {
                        if let Some(name) = self.relative_name(&path) {
                            found.push(name);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "skipping unreadable path"),
                }
            }
        }
        found.sort();
        found.dedup();
        tracing::debug!(root = %self.root.display(), count = found.len(), "listed documents");
        Ok(found)
    }

    async fn read(&self, path: &str) -> Result<String, StoreError> {
        if let Some(hit) = self.cached(path) {
            return Ok(hit.to_string());
        }
        let content = self.read_fresh(path).await?;
        self.remember(path, &content);
        Ok(content)
    }

    async fn process(&self, path: &str, edit: DocumentEdit) -> Result<String, StoreError> {
        let lock = self.write_lock(path).await;
        let _guard = lock.lock().await;

        let current = self.read_fresh(path).await?;
        let next = edit(current.as_str());
        if next == current {
            self.remember(path, &current);
            return Ok(current);
        }

        self.write_atomic(path, &next).await?;
        self.remember(path, &next);
        let _ = self.events.send(DocumentEvent::Modified(path.to_string()));
        tracing::debug!(path, bytes = next.len(), "document rewritten");
        Ok(next)
    }

    fn subscribe(&self) -> broadcast::Receiver<DocumentEvent> {
        self.events.subscribe()
    }
}
