//! Round-trip rewrite: serialize an edited task and splice it back into its
//! document without disturbing any other byte.

pub mod adjust;
pub mod markdown;
pub mod save;

pub use adjust::{adjust_task, adjust_tasks, OffsetShift};
pub use markdown::{convert_task_to_markdown, new_task_markdown, rewrite_task, RewriteOutput};
pub use save::{append_task, save_task, SaveOutcome};
