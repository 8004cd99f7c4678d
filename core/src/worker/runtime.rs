use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::{ParserConfig, WorkerConfig};
use crate::parser::parse_tasks_with;
use crate::store::TaskStore;

use super::client::WorkerClient;
use super::protocol::{RpcRequest, RpcResponse, WorkerMessage};

/// A parse request waiting for its content.
#[derive(Debug)]
struct HeldRequest {
    id: u64,
    path: String,
}

/// The background parse context. Owns the task store handle; nothing else
/// writes parse results.
pub struct WorkerRuntime {
    store: Arc<dyn TaskStore>,
    parser: ParserConfig,
    app_id: Option<String>,
    held: Option<HeldRequest>,
}

impl WorkerRuntime {
    pub fn new(store: Arc<dyn TaskStore>, parser: ParserConfig) -> Self {
        Self {
            store,
            parser,
            app_id: None,
            held: None,
        }
    }

    /// Serve messages one at a time until the request side closes.
    pub async fn run(
        mut self,
        mut requests: mpsc::Receiver<WorkerMessage>,
        replies: mpsc::Sender<RpcResponse>,
    ) {
        while let Some(message) = requests.recv().await {
            for reply in self.handle(message).await {
                if replies.send(reply).await.is_err() {
                    tracing::debug!("reply channel closed; worker stopping");
                    return;
                }
            }
        }
        tracing::debug!("request channel closed; worker stopping");
    }

    /// Process one message, returning the replies it produced (possibly none).
    pub async fn handle(&mut self, message: WorkerMessage) -> Vec<RpcResponse> {
        match message {
            WorkerMessage::Request(RpcRequest::HealthCheck { id, app_id }) => {
                vec![self.bind(id, app_id)]
            }
            WorkerMessage::Request(RpcRequest::ParseMarkdown {
                id, path, content, ..
            }) => {
                if self.app_id.is_none() {
                    return vec![RpcResponse::error(
                        id,
                        "worker is not bound; send health-check first",
                    )];
                }
                match content {
                    Some(content) => vec![self.parse(id, path, content).await],
                    None => self.hold(HeldRequest { id, path }),
                }
            }
            WorkerMessage::Supplemental(content) => match self.held.take() {
                Some(held) => vec![self.parse(held.id, held.path, content).await],
                None => {
                    tracing::warn!(
                        bytes = content.len(),
                        "supplemental payload without a held request dropped"
                    );
                    Vec::new()
                }
            },
        }
    }

    fn bind(&mut self, id: u64, app_id: String) -> RpcResponse {
        let result = match &self.app_id {
            None => {
                tracing::info!(app_id = %app_id, "worker bound");
                self.app_id = Some(app_id);
                true
            }
            Some(bound) if *bound == app_id => true,
            Some(bound) => {
                tracing::warn!(bound = %bound, requested = %app_id, "health-check for a different app id");
                false
            }
        };
        RpcResponse::HealthCheck { id, result }
    }

    fn hold(&mut self, request: HeldRequest) -> Vec<RpcResponse> {
        let new_id = request.id;
        match self.held.replace(request) {
            Some(replaced) => {
                tracing::warn!(
                    replaced = replaced.id,
                    by = new_id,
                    path = %replaced.path,
                    "held request replaced before its content arrived"
                );
                vec![RpcResponse::error(
                    replaced.id,
                    format!("request superseded by {new_id} before its content arrived"),
                )]
            }
            None => Vec::new(),
        }
    }

    async fn parse(&self, id: u64, path: String, content: String) -> RpcResponse {
        let parser = self.parser.clone();
        let doc_path = path.clone();
        let parsed =
            tokio::task::spawn_blocking(move || parse_tasks_with(&doc_path, &content, &parser))
                .await;

        let tasks = match parsed {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::error!(path = %path, error = %e, "parse job failed");
                return RpcResponse::error(id, format!("parse job failed: {e}"));
            }
        };

        let count = tasks.len();
        tracing::debug!(path = %path, count, "parsed document");

        if let Err(e) = self.store.replace_path(&path, tasks).await {
            tracing::error!(path = %path, error = %e, "failed to store parsed tasks");
        }

        RpcResponse::ParseMarkdown {
            id,
            success: true,
            processed_count: Some(count),
        }
    }
}

/// Start a worker on its own task and return a client connected to it.
pub fn spawn_worker(
    store: Arc<dyn TaskStore>,
    parser: ParserConfig,
    config: &WorkerConfig,
) -> WorkerClient {
    let (request_tx, request_rx) = mpsc::channel(config.channel_capacity.max(1));
    let (reply_tx, reply_rx) = mpsc::channel(config.channel_capacity.max(1));

    let runtime = WorkerRuntime::new(store, parser);
    tokio::spawn(runtime.run(request_rx, reply_tx));

    WorkerClient::new(
        request_tx,
        reply_rx,
        config.request_timeout_ms.map(Duration::from_millis),
    )
}
