use std::path::Path;

use serde_json::json;
use tokio::sync::broadcast;

use tasktrack_core::api::{AppConfig, CliError, IndexingSummary, TaskStoreEvent};

use super::cli::{IndexArgs, OutputFormat};
use super::indexed_services;

fn print_summary(summary: &IndexingSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", json!(summary)),
        OutputFormat::Text => println!(
            "indexed {}/{} documents ({} failed) in {}ms",
            summary.processed, summary.total, summary.errors, summary.elapsed_ms
        ),
    }
}

/// Exit code of a pass: 0 when every document was indexed, 1 otherwise.
pub fn exit_code_for_summary(summary: &IndexingSummary) -> i32 {
    if summary.errors == 0 {
        0
    } else {
        1
    }
}

pub async fn handle_index(
    args: IndexArgs,
    cfg: &AppConfig,
    root: &Path,
    format: OutputFormat,
) -> Result<i32, CliError> {
    let show_progress = !args.no_progress && atty::is(atty::Stream::Stderr);
    let (_services, summary) = indexed_services(cfg, root, show_progress).await?;
    print_summary(&summary, format);
    Ok(exit_code_for_summary(&summary))
}

pub async fn handle_watch(
    args: IndexArgs,
    cfg: &AppConfig,
    root: &Path,
    format: OutputFormat,
) -> Result<i32, CliError> {
    let show_progress = !args.no_progress && atty::is(atty::Stream::Stderr);
    let (services, summary) = indexed_services(cfg, root, show_progress).await?;
    print_summary(&summary, format);

    let mut changes = services.tasks.subscribe();
    let (_watcher, live) = services.watch()?;
    eprintln!("watching {} (ctrl-c to stop)", root.display());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            change = changes.recv() => match change {
                Ok(TaskStoreEvent::PathReplaced { path, count }) => match format {
                    OutputFormat::Json => println!("{}", json!({ "path": path, "tasks": count })),
                    OutputFormat::Text => println!("{path}: {count} tasks"),
                },
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "task change feed lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    live.abort();
    Ok(0)
}
