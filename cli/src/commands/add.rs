use std::path::Path;

use serde_json::json;

use tasktrack_core::api::{append_task, parse_tasks_with, AppConfig, CliError, TaskDetails};
use tasktrack_plugins::factory::build_document_store;

use super::cli::{AddArgs, OutputFormat};
use super::edit::apply_edits;
use super::list::format_task_line;

pub async fn handle_add(
    args: AddArgs,
    cfg: &AppConfig,
    root: &Path,
    format: OutputFormat,
) -> Result<i32, CliError> {
    if args.fields.title.is_none() {
        return Err(CliError::Command("a new task needs --title".to_string()));
    }

    let documents = build_document_store(cfg, root);
    if !documents.is_document(Path::new(&args.path)) {
        return Err(CliError::Command(format!(
            "{} is not an indexed document type",
            args.path
        )));
    }

    let details = apply_edits(TaskDetails::default(), &args.fields, &cfg.parser.priorities)?;
    let document = append_task(documents.as_ref(), &args.path, &details).await?;

    let added = parse_tasks_with(&args.path, &document, &cfg.parser)
        .pop()
        .ok_or_else(|| CliError::Command(format!("{} has no tasks after the append", args.path)))?;
    match format {
        OutputFormat::Json => println!("{}", json!(added)),
        OutputFormat::Text => println!("{}", format_task_line(&added)),
    }
    Ok(0)
}
