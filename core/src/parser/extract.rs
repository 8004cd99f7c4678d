use std::ops::Range;

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::span::{count_lines, strip_leading_spaces, LineIndex};
use crate::task::{FileHash, Task};

use super::content::parse_content;
use super::tree::{parse_blocks, Node, NodeKind};

struct Source<'a> {
    path: &'a str,
    text: &'a str,
    lines: LineIndex,
    hash: FileHash,
    config: &'a ParserConfig,
}

impl Source<'_> {
    fn slice(&self, range: Range<usize>) -> Result<&str, ParseError> {
        self.text
            .get(range.clone())
            .ok_or(ParseError::Span {
                start: range.start,
                end: range.end,
            })
    }
}

/// Extract every checkbox task from `text` with the default parser settings.
pub fn parse_tasks(path: &str, text: &str) -> Vec<Task> {
    parse_tasks_with(path, text, &ParserConfig::default())
}

/// Extract every checkbox task from `text`, in document order.
///
/// Nested checkbox items are returned as separate tasks whose spans sit
/// inside their parent's span. Never fails: on an internal error the problem
/// is logged and no tasks are returned for this document.
pub fn parse_tasks_with(path: &str, text: &str, config: &ParserConfig) -> Vec<Task> {
    match try_parse_tasks(path, text, config) {
        Ok(tasks) => tasks,
        Err(e) => {
            tracing::error!(path, error = %e, "failed to parse markdown");
            Vec::new()
        }
    }
}

fn try_parse_tasks(path: &str, text: &str, config: &ParserConfig) -> Result<Vec<Task>, ParseError> {
    let root = parse_blocks(text)?;
    let source = Source {
        path,
        text,
        lines: LineIndex::new(text),
        hash: FileHash::of(text),
        config,
    };
    collect_tasks(&root, &source)
}

fn collect_tasks(node: &Node, source: &Source<'_>) -> Result<Vec<Task>, ParseError> {
    let mut tasks = Vec::new();
    for child in &node.children {
        if child.kind == NodeKind::Item {
            if let Some(task) = task_from_item(child, source)? {
                tasks.push(task);
            }
        }
        tasks.extend(collect_tasks(child, source)?);
    }
    Ok(tasks)
}

fn task_from_item(item: &Node, source: &Source<'_>) -> Result<Option<Task>, ParseError> {
    let Some(paragraph) = item.children.first() else {
        return Ok(None);
    };
    if paragraph.kind != NodeKind::Paragraph {
        return Ok(None);
    }

    let title_text = source.slice(paragraph.range.clone())?;
    let (_, paragraph_column) = source.lines.position(paragraph.range.start);

    let description = match (item.children.get(1), item.children.last()) {
        (Some(second), Some(last)) => {
            let body = source.slice(second.range.start..last.range.end)?;
            Some(dedent_description(body, paragraph_column))
        }
        _ => None,
    };

    let Some(details) = parse_content(title_text, description, &source.config.priorities) else {
        return Ok(None);
    };
    if details.title.is_empty() {
        return Ok(None);
    }

    let (start_line, start_column) = source.lines.position(item.range.start);
    let (end_line, _) = source.lines.position(item.range.end);

    if count_lines(&source.text[..item.range.start]) != start_line {
        tracing::error!(
            path = source.path,
            offset = item.range.start,
            "line count mismatch for list item"
        );
    }

    Ok(Some(Task {
        id: Task::make_id(source.path, paragraph.range.start),
        path: source.path.to_string(),
        start_line,
        start_column,
        start_offset: item.range.start,
        end_line,
        end_offset: item.range.end,
        file_hash: source.hash,
        details,
    }))
}

/// Strip the paragraph's indentation from every line but the first.
fn dedent_description(body: &str, column: usize) -> String {
    let mut lines = body.split('\n');
    let mut out = String::with_capacity(body.len());
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        out.push_str(strip_leading_spaces(column, line));
    }
    out
}
