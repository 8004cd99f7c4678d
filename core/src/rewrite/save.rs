use tokio::sync::oneshot;

use crate::error::{RewriteError, StoreError};
use crate::store::DocumentStore;
use crate::task::{FileHash, Task, TaskDetails};

use super::markdown::{new_task_markdown, rewrite_task};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { document: String, task: Task },
    /// The document changed since `base` was parsed; nothing was written.
    ChecksumConflict { expected: FileHash, actual: FileHash },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

/// Write `edited` over `base` in its document, but only if the document still
/// hashes to `base.file_hash`.
pub async fn save_task(
    store: &dyn DocumentStore,
    base: &Task,
    edited: &TaskDetails,
) -> Result<SaveOutcome, RewriteError> {
    let (tx, rx) = oneshot::channel();
    let owned_base = base.clone();
    let owned_edited = edited.clone();

    store
        .process(
            &base.path,
            Box::new(move |current: &str| {
                let actual = FileHash::of(current);
                let (result, content) = if actual != owned_base.file_hash {
                    (
                        Ok(SaveOutcome::ChecksumConflict {
                            expected: owned_base.file_hash,
                            actual,
                        }),
                        current.to_string(),
                    )
                } else {
                    match rewrite_task(current, &owned_base, &owned_edited) {
                        Ok(out) => {
                            let content = out.document.clone();
                            (
                                Ok(SaveOutcome::Saved {
                                    document: out.document,
                                    task: out.task,
                                }),
                                content,
                            )
                        }
                        Err(e) => (Err(e), current.to_string()),
                    }
                };
                let _ = tx.send(result);
                content
            }),
        )
        .await?;

    let outcome = rx
        .await
        .map_err(|_| StoreError::Backend("document edit was never applied".into()))??;

    match &outcome {
        SaveOutcome::Saved { task, .. } => {
            tracing::info!(task_id = %task.id, path = %task.path, "task saved");
        }
        SaveOutcome::ChecksumConflict { expected, actual } => {
            tracing::warn!(
                path = %base.path,
                %expected,
                %actual,
                "document changed since the task was read; save aborted"
            );
        }
    }

    Ok(outcome)
}

/// Append `details` as a new top-level task at the end of `path`, returning
/// the new document. The store's change notification carries it to the
/// indexer like any other edit.
pub async fn append_task(
    store: &dyn DocumentStore,
    path: &str,
    details: &TaskDetails,
) -> Result<String, RewriteError> {
    let block = new_task_markdown(details);
    let document = store
        .process(
            path,
            Box::new(move |current: &str| {
                let mut next = current.to_string();
                if !next.is_empty() && !next.ends_with('\n') {
                    next.push('\n');
                }
                next.push_str(&block);
                next.push('\n');
                next
            }),
        )
        .await?;
    tracing::info!(path, title = %details.title, "task appended");
    Ok(document)
}
