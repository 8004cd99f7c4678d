use serde::{Deserialize, Serialize};

/// Observations published while an indexing pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IndexingEvent {
    /// `indexed` documents out of `total` finished successfully so far.
    Progress { indexed: usize, total: usize },
    Completed {
        processed: usize,
        errors: usize,
        total: usize,
    },
}

/// Point-in-time view of the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingStatus {
    pub queue_size: usize,
    pub in_flight: usize,
    pub total: usize,
    pub processed: usize,
    pub errors: usize,
    pub indexing: bool,
}

/// Counters of a finished pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingSummary {
    pub total: usize,
    pub processed: usize,
    pub errors: usize,
    pub elapsed_ms: u64,
}
