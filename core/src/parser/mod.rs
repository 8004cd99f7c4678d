//! Task extraction: Markdown text → ordered [`Task`](crate::task::Task)s
//! with exact spans.

pub mod content;
pub mod extract;
pub mod tree;

pub use content::{parse_annotations, parse_content, parse_due_date, split_marker, with_due_date};
pub use extract::{parse_tasks, parse_tasks_with};
pub use tree::{parse_blocks, Node, NodeKind};
