use std::path::Path;

use serde_json::json;

use tasktrack_core::api::{
    adjust_tasks, parse_due_date, save_task, with_due_date, AppConfig, CliError, OffsetShift,
    PrioritySet, RewriteOutput, SaveOutcome, Task, TaskDetails, TaskFilter, TaskStatus,
};
use tasktrack_plugins::factory::Services;

use super::cli::{EditArgs, OutputFormat, TaskFields};
use super::indexed_services;

/// Apply the fields given on the command line to `details`.
///
/// The due date lives in the title text, so `due_date` always ends up as a
/// re-parse of the written title would report it.
pub fn apply_edits(
    mut details: TaskDetails,
    fields: &TaskFields,
    priorities: &PrioritySet,
) -> Result<TaskDetails, CliError> {
    if let Some(title) = &fields.title {
        if title.trim().is_empty() {
            return Err(CliError::Command("title cannot be empty".to_string()));
        }
        details.title = title.clone();
    }
    if let Some(name) = &fields.status {
        let status: TaskStatus = name.parse().map_err(CliError::Command)?;
        details.status = status;
        details.marker = status.marker();
    }
    if let Some(name) = &fields.priority {
        details.priority = priorities
            .parse(name)
            .ok_or_else(|| CliError::Command(format!("unknown priority: {name}")))?;
    }
    if let Some(description) = &fields.description {
        details.description = Some(description.clone()).filter(|d| !d.trim().is_empty());
    }
    if let Some(due) = &fields.due {
        let due = Some(due.trim()).filter(|d| !d.is_empty());
        details.title = with_due_date(&details.title, due).map_err(CliError::Command)?;
        if details.title.is_empty() {
            return Err(CliError::Command("title cannot be empty".to_string()));
        }
    }
    details.due_date = parse_due_date(&details.title);
    Ok(details)
}

/// Save the edit described by `args` and bring the task store in line with
/// the new document. Returns `None` when the edit changes nothing.
pub async fn edit_task(
    services: &Services,
    args: &EditArgs,
    priorities: &PrioritySet,
) -> Result<Option<Task>, CliError> {
    let all = services.tasks.query_all(&TaskFilter::default()).await?;
    let base = all
        .iter()
        .find(|t| t.id == args.id)
        .cloned()
        .ok_or_else(|| CliError::Command(format!("no task with id {}", args.id)))?;

    let edited = apply_edits(base.details(), &args.fields, priorities)?;
    if edited == base.details() {
        tracing::info!(id = %base.id, "nothing to change");
        return Ok(None);
    }

    let (document, task) = match save_task(services.documents.as_ref(), &base, &edited).await? {
        SaveOutcome::Saved { document, task } => (document, task),
        SaveOutcome::ChecksumConflict { expected, actual } => {
            tracing::debug!(%expected, %actual, "edit rejected");
            return Err(CliError::Command(format!(
                "{} changed while editing; re-run to edit the current version",
                base.path
            )));
        }
    };

    let output = RewriteOutput { document, task };
    let same_document: Vec<Task> = all.into_iter().filter(|t| t.path == base.path).collect();
    let adjusted = adjust_tasks(&same_document, &OffsetShift::new(&base, &output))?;
    services.tasks.bulk_put(adjusted).await?;

    Ok(Some(output.task))
}

pub async fn handle_edit(
    args: EditArgs,
    cfg: &AppConfig,
    root: &Path,
    format: OutputFormat,
) -> Result<i32, CliError> {
    let (services, _) = indexed_services(cfg, root, false).await?;

    if let Some(task) = edit_task(&services, &args, &cfg.parser.priorities).await? {
        match format {
            OutputFormat::Json => println!("{}", json!(task)),
            OutputFormat::Text => println!("saved {} in {}", task.id, task.path),
        }
    }
    Ok(0)
}
