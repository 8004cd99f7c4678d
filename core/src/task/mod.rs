//! Task entity: identity, span bookkeeping, status and priority vocabularies.

pub mod model;
pub mod priority;
pub mod status;

pub use model::{FileHash, Task, TaskDetails};
pub use priority::{PrioritySet, TaskPriority};
pub use status::{TaskStatus, CLOSED_STATUSES, OPEN_STATUSES};
