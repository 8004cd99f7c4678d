//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `tasktrack_core::api` instead of reaching into internal modules.

pub use crate::config::{
    load_default, AppConfig, IndexingConfig, LoggingConfig, ParserConfig, StoreConfig,
    WorkerConfig,
};
pub use crate::error::{
    CliError, ConfigError, IndexingError, RewriteError, StoreError, WorkerError,
};
pub use crate::indexing::{IndexingEvent, IndexingService, IndexingStatus, IndexingSummary};
pub use crate::parser::{parse_due_date, parse_tasks, parse_tasks_with, with_due_date};
pub use crate::rewrite::{
    adjust_tasks, append_task, convert_task_to_markdown, new_task_markdown, rewrite_task,
    save_task, OffsetShift, RewriteOutput, SaveOutcome,
};
pub use crate::search::{parse_query, TaskFilter};
pub use crate::store::{DocumentEdit, DocumentEvent, DocumentStore, TaskStore, TaskStoreEvent};
pub use crate::task::{
    FileHash, PrioritySet, Task, TaskDetails, TaskPriority, TaskStatus, CLOSED_STATUSES,
    OPEN_STATUSES,
};
pub use crate::worker::{spawn_worker, ParseDispatcher, ParseReply, WorkerClient};
