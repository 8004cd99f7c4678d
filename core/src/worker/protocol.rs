use serde::{Deserialize, Serialize};

/// Requests understood by the parse worker. Every request carries an id that
/// is unique among the requests currently awaiting a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RpcRequest {
    HealthCheck {
        id: u64,
        #[serde(rename = "appId")]
        app_id: String,
    },
    ParseMarkdown {
        id: u64,
        path: String,
        /// `None` when the text follows as a [`WorkerMessage::Supplemental`].
        content: Option<String>,
        /// Unix milliseconds at dispatch.
        timestamp: i64,
    },
}

impl RpcRequest {
    pub fn id(&self) -> u64 {
        match self {
            RpcRequest::HealthCheck { id, .. } | RpcRequest::ParseMarkdown { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RpcRequest::HealthCheck { .. } => "health-check",
            RpcRequest::ParseMarkdown { .. } => "parse-markdown",
        }
    }

    /// Whether this request still waits for its content.
    pub fn awaits_content(&self) -> bool {
        matches!(self, RpcRequest::ParseMarkdown { content: None, .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RpcResponse {
    HealthCheck {
        id: u64,
        result: bool,
    },
    ParseMarkdown {
        id: u64,
        success: bool,
        #[serde(
            rename = "processedCount",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        processed_count: Option<usize>,
    },
    Error {
        id: u64,
        error: String,
    },
}

impl RpcResponse {
    pub fn id(&self) -> u64 {
        match self {
            RpcResponse::HealthCheck { id, .. }
            | RpcResponse::ParseMarkdown { id, .. }
            | RpcResponse::Error { id, .. } => *id,
        }
    }

    pub fn error(id: u64, error: impl Into<String>) -> Self {
        RpcResponse::Error {
            id,
            error: error.into(),
        }
    }
}

/// One message on the request side of the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerMessage {
    Request(RpcRequest),
    /// Document text for the request currently held by the worker.
    Supplemental(String),
}
