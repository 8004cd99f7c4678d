use serde::{Deserialize, Serialize};

use crate::task::PrioritySet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Identity the worker session is bound to during the health handshake.
    #[serde(default = "default_app_id")]
    pub app_id: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub worker: WorkerConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

fn default_app_id() -> String {
    "tasktrack".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            logging: LoggingConfig::default(),
            parser: ParserConfig::default(),
            indexing: IndexingConfig::default(),
            worker: WorkerConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "tasktrack_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Accepted `[priority::...]` values. `wish` is only recognized when
    /// listed here.
    #[serde(default)]
    pub priorities: PrioritySet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Maximum number of documents in flight at once.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// File extensions (without dot) treated as indexable documents.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_window_size() -> usize {
    25
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            extensions: default_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Per-request timeout. Unset means a stuck request holds its slot.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: None,
            channel_capacity: default_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Number of documents kept in the read cache.
    #[serde(default = "default_read_cache_size")]
    pub read_cache_size: usize,

    /// Capacity of change-notification channels.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_read_cache_size() -> usize {
    128
}

fn default_event_capacity() -> usize {
    1024
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            read_cache_size: default_read_cache_size(),
            event_capacity: default_event_capacity(),
        }
    }
}
