//! Collaborator boundaries: where documents come from and where parsed
//! tasks go.

pub mod document;
pub mod tasks;

pub use document::{DocumentEdit, DocumentEvent, DocumentStore};
pub use tasks::{TaskStore, TaskStoreEvent};
