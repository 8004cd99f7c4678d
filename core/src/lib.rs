pub mod api;
pub mod config;
pub mod error;
pub mod indexing;
pub mod parser;
pub mod rewrite;
pub mod search;
pub mod span;
pub mod store;
pub mod task;
pub mod worker;
