use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::{broadcast, RwLock};

use crate::config::IndexingConfig;
use crate::error::{IndexingError, WorkerError};
use crate::store::{DocumentEvent, DocumentStore, TaskStore};
use crate::worker::ParseDispatcher;

use super::events::{IndexingEvent, IndexingStatus, IndexingSummary};
use super::window::DispatchWindow;

#[derive(Debug, Default)]
struct PassState {
    queue: VecDeque<String>,
    /// Document path → dispatch start.
    in_flight: HashMap<String, Instant>,
    total: usize,
    processed: usize,
    errors: usize,
}

/// Drives indexing passes over every document and keeps the task store in
/// step with live document changes.
#[derive(Clone)]
pub struct IndexingService {
    inner: Arc<IndexingInner>,
}

struct IndexingInner {
    app_id: String,
    documents: Arc<dyn DocumentStore>,
    tasks: Arc<dyn TaskStore>,
    dispatcher: Arc<dyn ParseDispatcher>,
    window: DispatchWindow,
    state: RwLock<PassState>,
    indexing: AtomicBool,
    healthy: AtomicBool,
    event_tx: broadcast::Sender<IndexingEvent>,
}

impl IndexingService {
    pub fn new(
        app_id: impl Into<String>,
        documents: Arc<dyn DocumentStore>,
        tasks: Arc<dyn TaskStore>,
        dispatcher: Arc<dyn ParseDispatcher>,
        config: &IndexingConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(IndexingInner {
                app_id: app_id.into(),
                documents,
                tasks,
                dispatcher,
                window: DispatchWindow::new(config.window_size),
                state: RwLock::new(PassState::default()),
                indexing: AtomicBool::new(false),
                healthy: AtomicBool::new(false),
                event_tx,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IndexingEvent> {
        self.inner.event_tx.subscribe()
    }

    fn emit(&self, event: IndexingEvent) {
        let _ = self.inner.event_tx.send(event);
    }

    pub fn is_indexing(&self) -> bool {
        self.inner.indexing.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> IndexingStatus {
        let state = self.inner.state.read().await;
        IndexingStatus {
            queue_size: state.queue.len(),
            in_flight: state.in_flight.len(),
            total: state.total,
            processed: state.processed,
            errors: state.errors,
            indexing: self.is_indexing(),
        }
    }

    /// Run one full pass over every document the store exposes.
    ///
    /// Returns `Ok(None)` without doing anything when a pass is already
    /// running. Per-document failures are counted, never returned.
    pub async fn start_indexing(&self) -> Result<Option<IndexingSummary>, IndexingError> {
        if self.inner.indexing.swap(true, Ordering::AcqRel) {
            tracing::info!("indexing already in progress");
            return Ok(None);
        }

        let result = self.run_pass().await;
        self.inner.indexing.store(false, Ordering::Release);

        if let Err(e) = &result {
            tracing::error!(error = %e, "indexing pass aborted");
        }
        result.map(Some)
    }

    async fn ensure_healthy(&self) -> Result<(), IndexingError> {
        if self.inner.healthy.load(Ordering::Acquire) {
            return Ok(());
        }

        let app_id = &self.inner.app_id;
        match self.inner.dispatcher.health_check(app_id).await {
            Ok(true) => {
                tracing::info!(app_id = %app_id, "worker health check passed");
                self.inner.healthy.store(true, Ordering::Release);
                Ok(())
            }
            Ok(false) => Err(IndexingError::WorkerUnavailable(WorkerError::Unhealthy {
                app_id: app_id.clone(),
            })),
            Err(e) => Err(IndexingError::WorkerUnavailable(e)),
        }
    }

    async fn run_pass(&self) -> Result<IndexingSummary, IndexingError> {
        self.ensure_healthy().await?;

        let started = Instant::now();
        let paths = self.inner.documents.list().await?;
        let total = paths.len();

        *self.inner.state.write().await = PassState {
            queue: paths.into(),
            total,
            ..PassState::default()
        };
        self.emit(IndexingEvent::Progress { indexed: 0, total });

        if total == 0 {
            tracing::info!("no documents to index");
        } else {
            tracing::info!(total, window = self.inner.window.size(), "indexing started");
        }

        let mut running = FuturesUnordered::new();
        loop {
            while let Some(permit) = self.inner.window.try_admit() {
                let Some(path) = self.dequeue().await else {
                    break;
                };
                let this = self.clone();
                running.push(async move {
                    let outcome = this.send_document_to_worker(&path).await;
                    drop(permit);
                    (path, outcome)
                });
            }

            let Some((path, outcome)) = running.next().await else {
                break;
            };
            self.finish(path, outcome).await;
        }

        let state = self.inner.state.read().await;
        let summary = IndexingSummary {
            total: state.total,
            processed: state.processed,
            errors: state.errors,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        drop(state);

        tracing::info!(
            processed = summary.processed,
            errors = summary.errors,
            total = summary.total,
            elapsed_ms = summary.elapsed_ms,
            "indexing completed"
        );
        self.emit(IndexingEvent::Completed {
            processed: summary.processed,
            errors: summary.errors,
            total: summary.total,
        });
        Ok(summary)
    }

    async fn dequeue(&self) -> Option<String> {
        let mut state = self.inner.state.write().await;
        let path = state.queue.pop_front()?;
        state.in_flight.insert(path.clone(), Instant::now());
        let event = IndexingEvent::Progress {
            indexed: state.processed,
            total: state.total,
        };
        drop(state);
        self.emit(event);
        Some(path)
    }

    async fn finish(&self, path: String, outcome: Result<usize, IndexingError>) {
        let mut state = self.inner.state.write().await;
        let started = state.in_flight.remove(&path);
        match outcome {
            Ok(count) => {
                state.processed += 1;
                tracing::debug!(
                    path = %path,
                    tasks = count,
                    elapsed_ms = started.map(|t| t.elapsed().as_millis() as u64),
                    "document indexed"
                );
            }
            Err(e) => {
                state.errors += 1;
                tracing::warn!(path = %path, error = %e, "document failed to index");
            }
        }
        let event = IndexingEvent::Progress {
            indexed: state.processed,
            total: state.total,
        };
        drop(state);
        self.emit(event);
    }

    /// Read one document and have the worker parse it. Returns the number of
    /// tasks the worker extracted.
    pub async fn send_document_to_worker(&self, path: &str) -> Result<usize, IndexingError> {
        let content = self
            .inner
            .documents
            .read(path)
            .await
            .map_err(|source| IndexingError::Read {
                path: path.to_string(),
                source,
            })?;

        let reply = self
            .inner
            .dispatcher
            .parse_markdown(path, content)
            .await
            .map_err(|source| IndexingError::Dispatch {
                path: path.to_string(),
                source,
            })?;

        if !reply.success {
            return Err(IndexingError::Rejected(path.to_string()));
        }
        Ok(reply.processed_count)
    }

    /// React to one document change outside of any pass.
    pub async fn handle_document_event(&self, event: &DocumentEvent) -> Result<(), IndexingError> {
        match event {
            DocumentEvent::Created(path) | DocumentEvent::Modified(path) => {
                let count = self.send_document_to_worker(path).await?;
                tracing::debug!(path = %path, tasks = count, "document re-indexed");
            }
            DocumentEvent::Deleted(path) => {
                let removed = self.inner.tasks.delete_by_path(path).await?;
                tracing::debug!(path = %path, removed, "tasks of deleted document cleared");
            }
        }
        Ok(())
    }

    /// Apply document changes until the subscription closes. Failures are
    /// logged per event.
    pub async fn run_live_updates(&self, mut events: broadcast::Receiver<DocumentEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle_document_event(&event).await {
                        tracing::warn!(path = %event.path(), error = %e, "live update failed");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "document events dropped; run a full pass to resync");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("document event stream closed");
    }
}
