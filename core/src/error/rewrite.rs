use thiserror::Error;

use super::indexing::StoreError;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("task span {start}..{end} does not fit a document of {len} bytes")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },

    /// Two tasks of one document claim overlapping byte ranges after an edit.
    /// This is a broken offset-adjustment invariant, never a user error.
    #[error(
        "task {task_id} ({task_start}..{task_end}) overlaps rewritten range {start}..{end}"
    )]
    SpanOverlap {
        task_id: String,
        task_start: usize,
        task_end: usize,
        start: usize,
        end: usize,
    },

    #[error("document store failed: {0}")]
    Store(#[from] StoreError),
}
