use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::error::WorkerError;

use super::protocol::{RpcRequest, RpcResponse, WorkerMessage};

/// Outcome of one parse request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseReply {
    pub success: bool,
    pub processed_count: usize,
}

/// What the indexing pipeline needs from the worker channel.
#[async_trait]
pub trait ParseDispatcher: Send + Sync {
    async fn health_check(&self, app_id: &str) -> Result<bool, WorkerError>;

    async fn parse_markdown(&self, path: &str, content: String) -> Result<ParseReply, WorkerError>;
}

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<RpcResponse>>>>;

/// Request/reply client for the parse worker.
///
/// Replies are matched to callers by correlation id. Cheap to clone; all
/// clones share one channel.
#[derive(Clone)]
pub struct WorkerClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    /// Held across a request and its supplemental payload so no other
    /// request can slip in between.
    sender: Mutex<mpsc::Sender<WorkerMessage>>,
    pending: Pending,
    next_id: AtomicU64,
    timeout: Option<Duration>,
}

impl WorkerClient {
    /// Wrap the two halves of a worker channel and start routing replies.
    pub fn new(
        sender: mpsc::Sender<WorkerMessage>,
        replies: mpsc::Receiver<RpcResponse>,
        timeout: Option<Duration>,
    ) -> Self {
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        tokio::spawn(route_replies(replies, pending.clone()));

        Self {
            inner: Arc::new(ClientInner {
                sender: Mutex::new(sender),
                pending,
                next_id: AtomicU64::new(0),
                timeout,
            }),
        }
    }

    /// Number of requests still waiting for a reply.
    pub async fn pending_count(&self) -> usize {
        self.inner.pending.lock().await.len()
    }

    /// Send a request (and optional supplemental payload), then wait for the
    /// reply carrying the same id. Error replies become [`WorkerError::Remote`].
    pub async fn call<F>(
        &self,
        build: F,
        supplemental: Option<String>,
    ) -> Result<RpcResponse, WorkerError>
    where
        F: FnOnce(u64) -> RpcRequest + Send,
    {
        let inner = &self.inner;
        let id = inner.next_id.fetch_add(1, Ordering::Relaxed);
        let request = build(id);
        let (tx, rx) = oneshot::channel();
        inner.pending.lock().await.insert(id, tx);

        tracing::debug!(id, kind = request.kind(), "worker request");

        let sent = {
            let sender = inner.sender.lock().await;
            match sender.send(WorkerMessage::Request(request)).await {
                Ok(()) => match supplemental {
                    Some(content) => sender.send(WorkerMessage::Supplemental(content)).await,
                    None => Ok(()),
                },
                Err(e) => Err(e),
            }
        };
        if sent.is_err() {
            inner.pending.lock().await.remove(&id);
            return Err(WorkerError::ChannelClosed);
        }

        let reply = match inner.timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(reply) => reply,
                Err(_) => {
                    inner.pending.lock().await.remove(&id);
                    return Err(WorkerError::Timeout {
                        id,
                        timeout_ms: limit.as_millis() as u64,
                    });
                }
            },
            None => rx.await,
        };

        match reply.map_err(|_| WorkerError::ChannelClosed)? {
            RpcResponse::Error { id, error } => Err(WorkerError::Remote { id, message: error }),
            reply => Ok(reply),
        }
    }
}

async fn route_replies(mut replies: mpsc::Receiver<RpcResponse>, pending: Pending) {
    while let Some(reply) = replies.recv().await {
        let waiter = pending.lock().await.remove(&reply.id());
        match waiter {
            Some(tx) => {
                let _ = tx.send(reply);
            }
            None => {
                tracing::warn!(id = reply.id(), "reply for unknown or expired request dropped");
            }
        }
    }
    // Dropping the senders wakes every waiter with `ChannelClosed`.
    pending.lock().await.clear();
    tracing::debug!("worker reply channel closed");
}

#[async_trait]
impl ParseDispatcher for WorkerClient {
    async fn health_check(&self, app_id: &str) -> Result<bool, WorkerError> {
        let app_id = app_id.to_string();
        match self
            .call(|id| RpcRequest::HealthCheck { id, app_id }, None)
            .await?
        {
            RpcResponse::HealthCheck { result, .. } => Ok(result),
            other => Err(WorkerError::UnexpectedReply {
                id: other.id(),
                detail: format!("{other:?}"),
            }),
        }
    }

    /// Content always travels as a supplemental payload.
    async fn parse_markdown(&self, path: &str, content: String) -> Result<ParseReply, WorkerError> {
        let path = path.to_string();
        let timestamp = chrono::Utc::now().timestamp_millis();
        let reply = self
            .call(
                |id| RpcRequest::ParseMarkdown {
                    id,
                    path,
                    content: None,
                    timestamp,
                },
                Some(content),
            )
            .await?;

        match reply {
            RpcResponse::ParseMarkdown {
                success,
                processed_count,
                ..
            } => Ok(ParseReply {
                success,
                processed_count: processed_count.unwrap_or(0),
            }),
            other => Err(WorkerError::UnexpectedReply {
                id: other.id(),
                detail: format!("{other:?}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_client(
        timeout: Option<Duration>,
    ) -> (
        WorkerClient,
        mpsc::Receiver<WorkerMessage>,
        mpsc::Sender<RpcResponse>,
    ) {
        let (req_tx, req_rx) = mpsc::channel(16);
        let (rep_tx, rep_rx) = mpsc::channel(16);
        (WorkerClient::new(req_tx, rep_rx, timeout), req_rx, rep_tx)
    }

    #[tokio::test]
    async fn replies_are_correlated_by_id() {
        let (client, mut requests, replies) = echo_client(None);

        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Some(msg) = requests.recv().await {
                if let WorkerMessage::Request(req) = msg {
                    held.push(req.id());
                }
                if held.len() == 2 {
                    // Answer out of order.
                    for id in held.drain(..).rev() {
                        let _ = replies
                            .send(RpcResponse::HealthCheck { id, result: id == 1 })
                            .await;
                    }
                }
            }
        });

        let (a, b) = tokio::join!(client.health_check("x"), client.health_check("x"));
        let mut results = vec![a.unwrap(), b.unwrap()];
        results.sort();
        assert_eq!(results, vec![false, true]);
        assert_eq!(client.pending_count().await, 0);
    }

    #[tokio::test]
    async fn supplemental_follows_its_request() {
        let (client, mut requests, replies) = echo_client(None);

        tokio::spawn(async move {
            while let Some(msg) = requests.recv().await {
                let WorkerMessage::Request(req) = msg else {
                    panic!("supplemental arrived without a request");
                };
                assert!(req.awaits_content());
                let Some(WorkerMessage::Supplemental(text)) = requests.recv().await else {
                    panic!("request not followed by its content");
                };
                let _ = replies
                    .send(RpcResponse::ParseMarkdown {
                        id: req.id(),
                        success: true,
                        processed_count: Some(text.len()),
                    })
                    .await;
            }
        });

        let calls = (0..8).map(|n| {
            let client = client.clone();
            async move { client.parse_markdown("a.md", "x".repeat(n)).await }
        });
        let replies = futures::future::join_all(calls).await;
        for (n, reply) in replies.into_iter().enumerate() {
            assert_eq!(reply.unwrap().processed_count, n);
        }
    }

    #[tokio::test]
    async fn error_reply_is_remote_error() {
        let (client, mut requests, replies) = echo_client(None);
        tokio::spawn(async move {
            while let Some(WorkerMessage::Request(req)) = requests.recv().await {
                let _ = replies.send(RpcResponse::error(req.id(), "not ready")).await;
            }
        });

        let err = client.health_check("x").await.unwrap_err();
        assert_eq!(
            err,
            WorkerError::Remote {
                id: 0,
                message: "not ready".into()
            }
        );
    }

    #[tokio::test]
    async fn silent_worker_times_out() {
        let (client, _requests, _replies) = echo_client(Some(Duration::from_millis(20)));
        let err = client.health_check("x").await.unwrap_err();
        assert!(matches!(err, WorkerError::Timeout { timeout_ms: 20, .. }));
        assert_eq!(client.pending_count().await, 0);
    }

    #[tokio::test]
    async fn closed_worker_is_reported() {
        let (client, requests, replies) = echo_client(None);
        drop(requests);
        drop(replies);
        let err = client.health_check("x").await.unwrap_err();
        assert_eq!(err, WorkerError::ChannelClosed);
    }
}
