#[allow(clippy::module_inception)]
pub mod error;
pub mod indexing;
pub mod rewrite;
pub mod worker;

pub use error::{CliError, ConfigError, ParseError};
pub use indexing::{IndexingError, StoreError};
pub use rewrite::RewriteError;
pub use worker::WorkerError;
