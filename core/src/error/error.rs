use thiserror::Error;

use super::indexing::{IndexingError, StoreError};
use super::rewrite::RewriteError;
use super::worker::WorkerError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("indexing failed: {0}")]
    Indexing(#[from] IndexingError),
    #[error("rewrite failed: {0}")]
    Rewrite(#[from] RewriteError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("worker error: {0}")]
    Worker(#[from] WorkerError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Internal extraction failures. These never leave the parser: they are
/// logged and the document yields no tasks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed block structure: {0}")]
    Structure(String),
    #[error("span {start}..{end} does not fit the document")]
    Span { start: usize, end: usize },
}
