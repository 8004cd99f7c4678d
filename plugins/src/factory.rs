use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use tasktrack_core::config::AppConfig;
use tasktrack_core::indexing::IndexingService;
use tasktrack_core::store::{DocumentStore, TaskStore};
use tasktrack_core::worker::{spawn_worker, WorkerClient};

use crate::db::InMemoryTaskStore;
use crate::store::{DocumentWatcher, FsDocumentStore};

/// Everything a command needs to index, query and edit one notes directory.
pub struct Services {
    pub documents: Arc<FsDocumentStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub worker: WorkerClient,
    pub indexing: IndexingService,
}

impl Services {
    /// Start forwarding filesystem changes to the indexer. Both the watcher
    /// and the returned task must be kept alive for updates to flow.
    pub fn watch(&self) -> Result<(DocumentWatcher, tokio::task::JoinHandle<()>)> {
        let events = self.documents.subscribe();
        let watcher = DocumentWatcher::start(self.documents.clone())?;
        let indexing = self.indexing.clone();
        let live = tokio::spawn(async move { indexing.run_live_updates(events).await });
        Ok((watcher, live))
    }
}

pub fn build_document_store(cfg: &AppConfig, root: &Path) -> Arc<FsDocumentStore> {
    Arc::new(FsDocumentStore::new(
        root,
        cfg.indexing.extensions.clone(),
        cfg.store.read_cache_size,
        cfg.store.event_capacity,
    ))
}

pub fn build_task_store(cfg: &AppConfig) -> Arc<dyn TaskStore> {
    Arc::new(InMemoryTaskStore::new(cfg.store.event_capacity))
}

/// Wire stores, worker and indexer together. Must run inside a tokio
/// runtime since the worker is spawned immediately.
pub fn build_services(cfg: &AppConfig, root: &Path) -> Result<Services> {
    if !root.is_dir() {
        anyhow::bail!("notes directory not found: {}", root.display());
    }

    let documents = build_document_store(cfg, root);
    let tasks = build_task_store(cfg);
    let worker = spawn_worker(tasks.clone(), cfg.parser.clone(), &cfg.worker);
    let indexing = IndexingService::new(
        cfg.app_id.clone(),
        documents.clone(),
        tasks.clone(),
        Arc::new(worker.clone()),
        &cfg.indexing,
    );
    tracing::debug!(root = %root.display(), app_id = %cfg.app_id, "services built");

    Ok(Services {
        documents,
        tasks,
        worker,
        indexing,
    })
}
