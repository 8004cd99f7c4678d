use std::path::Path;

use tasktrack_core::api::{parse_query, AppConfig, CliError, Task, TaskPriority};

use super::cli::{ListArgs, OutputFormat};
use super::indexed_services;

/// One line per task: `[marker] title [priority]  id (line N)`.
pub fn format_task_line(task: &Task) -> String {
    let mut line = format!("[{}] {}", task.details.marker, task.title());
    if task.priority() != TaskPriority::None {
        line.push_str(&format!(" ({})", task.priority()));
    }
    line.push_str(&format!("  {} (line {})", task.id, task.start_line));
    line
}

pub async fn handle_list(
    args: ListArgs,
    cfg: &AppConfig,
    root: &Path,
    format: OutputFormat,
) -> Result<i32, CliError> {
    let (services, _) = indexed_services(cfg, root, false).await?;

    let filter = parse_query(&args.query.join(" "));
    let tasks = services.tasks.query_all(&filter).await?;
    tracing::debug!(query = ?args.query, hits = tasks.len(), "listed tasks");

    match format {
        OutputFormat::Json => {
            let out = serde_json::to_string_pretty(&tasks)
                .map_err(|e| CliError::Command(format!("cannot encode tasks: {e}")))?;
            println!("{out}");
        }
        OutputFormat::Text => {
            for task in &tasks {
                println!("{}", format_task_line(task));
            }
        }
    }
    Ok(0)
}
