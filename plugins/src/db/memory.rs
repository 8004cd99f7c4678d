//! In-process task database.
//!
//! Tasks are grouped per document and kept sorted by start offset, so a
//! full scan already yields the path-then-offset order queries promise.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use tasktrack_core::error::StoreError;
use tasktrack_core::search::TaskFilter;
use tasktrack_core::store::{TaskStore, TaskStoreEvent};
use tasktrack_core::task::Task;

pub struct InMemoryTaskStore {
    by_path: RwLock<BTreeMap<String, Vec<Task>>>,
    events: broadcast::Sender<TaskStoreEvent>,
}

impl InMemoryTaskStore {
    pub fn new(event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            by_path: RwLock::new(BTreeMap::new()),
            events,
        }
    }

    /// Look a task up by id.
    pub async fn get(&self, id: &str) -> Option<Task> {
        self.by_path
            .read()
            .await
            .values()
            .flatten()
            .find(|t| t.id == id)
            .cloned()
    }

    fn emit(&self, event: TaskStoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Insert or replace `task` in its path bucket, keeping offset order.
/// Returns true when an existing task with the same id was replaced.
fn upsert(bucket: &mut Vec<Task>, task: Task) -> bool {
    let replaced = match bucket.iter().position(|t| t.id == task.id) {
        Some(index) => {
            bucket.remove(index);
            true
        }
        None => false,
    };
    let at = bucket.partition_point(|t| t.start_offset <= task.start_offset);
    bucket.insert(at, task);
    replaced
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn put(&self, task: Task) -> Result<(), StoreError> {
        let replaced = {
            let mut map = self.by_path.write().await;
            upsert(map.entry(task.path.clone()).or_default(), task.clone())
        };
        self.emit(if replaced {
            TaskStoreEvent::Updated(task)
        } else {
            TaskStoreEvent::Created(task)
        });
        Ok(())
    }

    async fn bulk_put(&self, tasks: Vec<Task>) -> Result<(), StoreError> {
        let mut changes = Vec::with_capacity(tasks.len());
        {
            let mut map = self.by_path.write().await;
            for task in tasks {
                let replaced = upsert(map.entry(task.path.clone()).or_default(), task.clone());
                changes.push(if replaced {
                    TaskStoreEvent::Updated(task)
                } else {
                    TaskStoreEvent::Created(task)
                });
            }
        }
        for change in changes {
            self.emit(change);
        }
        Ok(())
    }

    async fn delete_by_path(&self, path: &str) -> Result<usize, StoreError> {
        let removed = self.by_path.write().await.remove(path).unwrap_or_default();
        tracing::debug!(path, count = removed.len(), "tasks removed");
        for task in &removed {
            self.emit(TaskStoreEvent::Deleted(task.id.clone()));
        }
        Ok(removed.len())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let mut map = self.by_path.write().await;
        let Some((path, index)) = map.iter().find_map(|(path, bucket)| {
            bucket
                .iter()
                .position(|t| t.id == id)
                .map(|index| (path.clone(), index))
        }) else {
            return Ok(false);
        };

        if let Some(bucket) = map.get_mut(&path) {
            bucket.remove(index);
            if bucket.is_empty() {
                map.remove(&path);
            }
        }
        drop(map);
        self.emit(TaskStoreEvent::Deleted(id.to_string()));
        Ok(true)
    }

    async fn query_all(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let map = self.by_path.read().await;
        Ok(map
            .values()
            .flatten()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.by_path.read().await.values().map(Vec::len).sum())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let paths: Vec<String> = std::mem::take(&mut *self.by_path.write().await)
            .into_keys()
            .collect();
        for path in paths {
            self.emit(TaskStoreEvent::PathReplaced { path, count: 0 });
        }
        Ok(())
    }

    async fn replace_path(&self, path: &str, mut tasks: Vec<Task>) -> Result<usize, StoreError> {
        tasks.retain(|t| {
            let ours = t.path == path;
            if !ours {
                tracing::warn!(path, task = %t.id, "dropping task parsed for another path");
            }
            ours
        });
        tasks.sort_by_key(|t| t.start_offset);
        let count = tasks.len();

        {
            let mut map = self.by_path.write().await;
            if tasks.is_empty() {
                map.remove(path);
            } else {
                map.insert(path.to_string(), tasks);
            }
        }

        self.emit(TaskStoreEvent::PathReplaced {
            path: path.to_string(),
            count,
        });
        Ok(count)
    }

    fn subscribe(&self) -> broadcast::Receiver<TaskStoreEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tasktrack_core::parser::parse_tasks;
    use tasktrack_core::search::parse_query;

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title()).collect()
    }

    #[tokio::test]
    async fn queries_are_ordered_by_path_then_offset() {
        let store = InMemoryTaskStore::new(16);
        store
            .replace_path("b.md", parse_tasks("b.md", "- [ ] b1\n- [ ] b2\n"))
            .await
            .unwrap();
        store
            .replace_path("a.md", parse_tasks("a.md", "- [x] a1\n- [ ] a2\n"))
            .await
            .unwrap();

        let all = store.query_all(&TaskFilter::default()).await.unwrap();
        assert_eq!(titles(&all), vec!["a1", "a2", "b1", "b2"]);

        let open = store.query_all(&parse_query("is:open b")).await.unwrap();
        assert_eq!(titles(&open), vec!["b1", "b2"]);
        assert_eq!(store.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn replace_path_swaps_whole_documents() {
        let store = InMemoryTaskStore::new(16);
        let mut events = store.subscribe();
        store
            .replace_path("a.md", parse_tasks("a.md", "- [ ] one\n- [ ] two\n"))
            .await
            .unwrap();
        let count = store
            .replace_path("a.md", parse_tasks("a.md", "- [ ] three\n"))
            .await
            .unwrap();

        assert_eq!(count, 1);
        let all = store.query_all(&TaskFilter::default()).await.unwrap();
        assert_eq!(titles(&all), vec!["three"]);
        assert_eq!(
            events.try_recv().unwrap(),
            TaskStoreEvent::PathReplaced {
                path: "a.md".into(),
                count: 2
            }
        );

        assert_eq!(store.replace_path("a.md", Vec::new()).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn put_reports_create_then_update() {
        let store = InMemoryTaskStore::new(16);
        let mut events = store.subscribe();
        let mut task = parse_tasks("a.md", "- [ ] milk\n").remove(0);

        store.put(task.clone()).await.unwrap();
        task.details.title = "oat milk".into();
        store.put(task.clone()).await.unwrap();

        assert!(matches!(events.try_recv().unwrap(), TaskStoreEvent::Created(_)));
        assert_eq!(events.try_recv().unwrap(), TaskStoreEvent::Updated(task.clone()));
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get(&task.id).await.unwrap().title(), "oat milk");
    }

    #[tokio::test]
    async fn deletes_by_id_and_path() {
        let store = InMemoryTaskStore::new(16);
        store
            .bulk_put(parse_tasks("a.md", "- [ ] a\n- [ ] b\n"))
            .await
            .unwrap();
        store
            .bulk_put(parse_tasks("c.md", "- [ ] c\n"))
            .await
            .unwrap();

        let first = store.query_all(&TaskFilter::default()).await.unwrap()[0].id.clone();
        assert!(store.delete_by_id(&first).await.unwrap());
        assert!(!store.delete_by_id(&first).await.unwrap());
        assert_eq!(store.delete_by_path("a.md").await.unwrap(), 1);
        assert_eq!(store.delete_by_path("a.md").await.unwrap(), 0);

        let left = store.query_all(&TaskFilter::default()).await.unwrap();
        assert_eq!(titles(&left), vec!["c"]);

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
