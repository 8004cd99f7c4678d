#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex, RwLock};

use tasktrack_core::error::{StoreError, WorkerError};
use tasktrack_core::search::TaskFilter;
use tasktrack_core::store::{DocumentEdit, DocumentEvent, DocumentStore, TaskStore, TaskStoreEvent};
use tasktrack_core::task::Task;
use tasktrack_core::worker::{ParseDispatcher, ParseReply};

/// Route `tracing` output through the test harness. Honors `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Documents kept in memory; writes publish change events.
pub struct MemoryDocuments {
    files: Mutex<BTreeMap<String, String>>,
    events: broadcast::Sender<DocumentEvent>,
}

impl MemoryDocuments {
    pub fn new<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            files: Mutex::new(
                files
                    .into_iter()
                    .map(|(p, t)| (p.to_string(), t.to_string()))
                    .collect(),
            ),
            events,
        }
    }

    pub async fn write(&self, path: &str, text: &str) {
        let existed = self
            .files
            .lock()
            .await
            .insert(path.to_string(), text.to_string())
            .is_some();
        let event = if existed {
            DocumentEvent::Modified(path.to_string())
        } else {
            DocumentEvent::Created(path.to_string())
        };
        let _ = self.events.send(event);
    }

    pub async fn remove(&self, path: &str) {
        self.files.lock().await.remove(path);
        let _ = self.events.send(DocumentEvent::Deleted(path.to_string()));
    }
}

#[async_trait]
impl DocumentStore for MemoryDocuments {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.files.lock().await.keys().cloned().collect())
    }

    async fn read(&self, path: &str) -> Result<String, StoreError> {
        self.files
            .lock()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn process(&self, path: &str, edit: DocumentEdit) -> Result<String, StoreError> {
        let mut files = self.files.lock().await;
        let current = files
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        let next = edit(current.as_str());
        if next != *current {
            *current = next;
            let _ = self.events.send(DocumentEvent::Modified(path.to_string()));
        }
        Ok(current.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<DocumentEvent> {
        self.events.subscribe()
    }
}

/// Task store over a map keyed by id.
pub struct MemoryTasks {
    tasks: RwLock<HashMap<String, Task>>,
    events: broadcast::Sender<TaskStoreEvent>,
}

impl MemoryTasks {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            tasks: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub async fn titles(&self) -> Vec<String> {
        self.query_all(&TaskFilter::default())
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.details.title)
            .collect()
    }
}

#[async_trait]
impl TaskStore for MemoryTasks {
    async fn put(&self, task: Task) -> Result<(), StoreError> {
        self.tasks.write().await.insert(task.id.clone(), task.clone());
        let _ = self.events.send(TaskStoreEvent::Created(task));
        Ok(())
    }

    async fn bulk_put(&self, tasks: Vec<Task>) -> Result<(), StoreError> {
        for task in tasks {
            self.put(task).await?;
        }
        Ok(())
    }

    async fn delete_by_path(&self, path: &str) -> Result<usize, StoreError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, t| t.path != path);
        Ok(before - tasks.len())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.tasks.write().await.remove(id).is_some())
    }

    async fn query_all(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let mut hits: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        hits.sort_by(|a, b| (&a.path, a.start_offset).cmp(&(&b.path, b.start_offset)));
        Ok(hits)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.tasks.read().await.len())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.tasks.write().await.clear();
        Ok(())
    }

    async fn replace_path(&self, path: &str, tasks: Vec<Task>) -> Result<usize, StoreError> {
        let mut map = self.tasks.write().await;
        map.retain(|_, t| t.path != path);
        let count = tasks.len();
        for task in tasks {
            map.insert(task.id.clone(), task);
        }
        let _ = self.events.send(TaskStoreEvent::PathReplaced {
            path: path.to_string(),
            count,
        });
        Ok(count)
    }

    fn subscribe(&self) -> broadcast::Receiver<TaskStoreEvent> {
        self.events.subscribe()
    }
}

/// Dispatcher that sleeps per document and records peak concurrency.
pub struct SlowDispatcher {
    pub delay: Duration,
    pub current: AtomicUsize,
    pub peak: AtomicUsize,
    pub calls: AtomicUsize,
    pub healthy: bool,
    /// Paths whose parse is reported as a worker failure.
    pub failing: Vec<String>,
}

impl SlowDispatcher {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            healthy: true,
            failing: Vec::new(),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ParseDispatcher for SlowDispatcher {
    async fn health_check(&self, _app_id: &str) -> Result<bool, WorkerError> {
        Ok(self.healthy)
    }

    async fn parse_markdown(&self, path: &str, content: String) -> Result<ParseReply, WorkerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.current.fetch_sub(1, Ordering::SeqCst);

        if self.failing.iter().any(|p| p == path) {
            return Err(WorkerError::Remote {
                id: 0,
                message: format!("cannot parse {path}"),
            });
        }
        Ok(ParseReply {
            success: true,
            processed_count: content.matches("- [").count(),
        })
    }
}

pub fn numbered_documents(n: usize) -> Vec<(String, String)> {
    (0..n)
        .map(|i| (format!("notes/{i:02}.md"), format!("- [ ] task {i}\n")))
        .collect()
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
