mod common;

use std::sync::Arc;
use std::time::Duration;

use common::MemoryTasks;
use pretty_assertions::assert_eq;
use tasktrack_core::config::{ParserConfig, WorkerConfig};
use tasktrack_core::search::TaskFilter;
use tasktrack_core::store::TaskStore;
use tasktrack_core::worker::{
    spawn_worker, ParseDispatcher, RpcRequest, RpcResponse, WorkerMessage, WorkerRuntime,
};

fn health(id: u64, app_id: &str) -> WorkerMessage {
    WorkerMessage::Request(RpcRequest::HealthCheck {
        id,
        app_id: app_id.to_string(),
    })
}

fn parse(id: u64, path: &str, content: Option<&str>) -> WorkerMessage {
    WorkerMessage::Request(RpcRequest::ParseMarkdown {
        id,
        path: path.to_string(),
        content: content.map(str::to_string),
        timestamp: 0,
    })
}

fn runtime(tasks: &Arc<MemoryTasks>) -> WorkerRuntime {
    WorkerRuntime::new(tasks.clone(), ParserConfig::default())
}

#[tokio::test]
async fn parse_before_health_check_is_rejected() {
    let tasks = Arc::new(MemoryTasks::new());
    let mut worker = runtime(&tasks);

    let replies = worker.handle(parse(1, "a.md", Some("- [ ] a\n"))).await;
    assert!(matches!(replies.as_slice(), [RpcResponse::Error { id: 1, .. }]));
    assert_eq!(tasks.count().await.unwrap(), 0);
}

#[tokio::test]
async fn first_app_id_wins() {
    let tasks = Arc::new(MemoryTasks::new());
    let mut worker = runtime(&tasks);

    assert_eq!(
        worker.handle(health(1, "vault")).await,
        vec![RpcResponse::HealthCheck { id: 1, result: true }]
    );
    assert_eq!(
        worker.handle(health(2, "vault")).await,
        vec![RpcResponse::HealthCheck { id: 2, result: true }]
    );
    assert_eq!(
        worker.handle(health(3, "other")).await,
        vec![RpcResponse::HealthCheck { id: 3, result: false }]
    );
}

#[tokio::test]
async fn held_request_runs_when_content_arrives() {
    let tasks = Arc::new(MemoryTasks::new());
    let mut worker = runtime(&tasks);
    worker.handle(health(0, "vault")).await;

    assert!(worker.handle(parse(1, "a.md", None)).await.is_empty());
    let replies = worker
        .handle(WorkerMessage::Supplemental("- [ ] one\n- [x] two\n".into()))
        .await;
    assert_eq!(
        replies,
        vec![RpcResponse::ParseMarkdown {
            id: 1,
            success: true,
            processed_count: Some(2)
        }]
    );
    assert_eq!(tasks.titles().await, vec!["one", "two"]);
}

#[tokio::test]
async fn second_held_request_replaces_the_first() {
    let tasks = Arc::new(MemoryTasks::new());
    let mut worker = runtime(&tasks);
    worker.handle(health(0, "vault")).await;

    assert!(worker.handle(parse(1, "a.md", None)).await.is_empty());
    let replies = worker.handle(parse(2, "b.md", None)).await;
    assert!(matches!(replies.as_slice(), [RpcResponse::Error { id: 1, .. }]));

    let replies = worker
        .handle(WorkerMessage::Supplemental("- [ ] from b\n".into()))
        .await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].id(), 2);

    let stored = tasks.query_all(&TaskFilter::default()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].path, "b.md");
}

#[tokio::test]
async fn orphan_supplemental_is_dropped() {
    let tasks = Arc::new(MemoryTasks::new());
    let mut worker = runtime(&tasks);
    worker.handle(health(0, "vault")).await;

    let replies = worker
        .handle(WorkerMessage::Supplemental("- [ ] stray\n".into()))
        .await;
    assert!(replies.is_empty());
    assert_eq!(tasks.count().await.unwrap(), 0);
}

#[tokio::test]
async fn reparse_replaces_the_path() {
    let tasks = Arc::new(MemoryTasks::new());
    let mut worker = runtime(&tasks);
    worker.handle(health(0, "vault")).await;

    worker
        .handle(parse(1, "a.md", Some("- [ ] old one\n- [ ] old two\n")))
        .await;
    worker
        .handle(parse(2, "b.md", Some("- [ ] untouched\n")))
        .await;
    worker.handle(parse(3, "a.md", Some("- [x] new\n"))).await;

    assert_eq!(tasks.titles().await, vec!["new", "untouched"]);
}

#[tokio::test]
async fn spawned_worker_serves_a_client() {
    let tasks = Arc::new(MemoryTasks::new());
    let config = WorkerConfig {
        request_timeout_ms: Some(2_000),
        ..WorkerConfig::default()
    };
    let client = spawn_worker(tasks.clone(), ParserConfig::default(), &config);

    assert!(client.health_check("vault").await.unwrap());
    let reply = client
        .parse_markdown("inbox.md", "- [ ] Call mom\n- [?] Plan trip\n".into())
        .await
        .unwrap();
    assert!(reply.success);
    assert_eq!(reply.processed_count, 2);
    assert_eq!(tasks.count().await.unwrap(), 2);

    // Concurrent requests each get their own reply.
    let calls = (0..10).map(|i| {
        let client = client.clone();
        async move {
            client
                .parse_markdown(&format!("n{i}.md"), "- [ ] x\n".repeat(i))
                .await
        }
    });
    let replies = futures::future::join_all(calls).await;
    for (i, reply) in replies.into_iter().enumerate() {
        assert_eq!(reply.unwrap().processed_count, i);
    }
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(client.pending_count().await, 0);
}
