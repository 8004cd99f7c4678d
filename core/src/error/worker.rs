use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    #[error("worker channel closed")]
    ChannelClosed,

    #[error("request {id} timed out after {timeout_ms}ms")]
    Timeout { id: u64, timeout_ms: u64 },

    #[error("worker replied with error for request {id}: {message}")]
    Remote { id: u64, message: String },

    #[error("unexpected reply to request {id}: {detail}")]
    UnexpectedReply { id: u64, detail: String },

    #[error("worker rejected health check for app {app_id}")]
    Unhealthy { app_id: String },
}
