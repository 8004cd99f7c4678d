use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::StoreError;
use crate::search::TaskFilter;
use crate::task::Task;

/// Change notifications published by a [`TaskStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStoreEvent {
    Created(Task),
    Updated(Task),
    /// Id of the removed task.
    Deleted(String),
    /// All tasks of `path` were swapped for `count` freshly parsed ones.
    PathReplaced { path: String, count: usize },
}

/// Reactive task database the worker writes into and queries read from.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn put(&self, task: Task) -> Result<(), StoreError>;

    async fn bulk_put(&self, tasks: Vec<Task>) -> Result<(), StoreError>;

    /// Remove every task of `path`, returning how many were removed.
    async fn delete_by_path(&self, path: &str) -> Result<usize, StoreError>;

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError>;

    /// Tasks matching `filter`, ordered by path then start offset.
    async fn query_all(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;

    /// Clear `path` and insert `tasks` as one unit: no reader observes a mix
    /// of old and new tasks for the path.
    async fn replace_path(&self, path: &str, tasks: Vec<Task>) -> Result<usize, StoreError>;

    fn subscribe(&self) -> broadcast::Receiver<TaskStoreEvent>;
}
