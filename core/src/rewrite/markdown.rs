use crate::error::RewriteError;
use crate::span::{count_lines, lead_whitespace_for_column};
use crate::task::{FileHash, Task, TaskDetails, TaskPriority};

/// Result of splicing an edited task back into its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutput {
    pub document: String,
    pub task: Task,
}

/// Canonical Markdown for one task, without any surrounding document text.
///
/// `base` only contributes its start column, which decides how far the
/// description block is indented.
pub fn convert_task_to_markdown(base: &Task, edited: &TaskDetails) -> String {
    markdown_at_column(base.start_column, edited)
}

/// Canonical Markdown for a task that does not exist yet, as a top-level
/// list item.
pub fn new_task_markdown(details: &TaskDetails) -> String {
    markdown_at_column(0, details)
}

fn markdown_at_column(start_column: usize, edited: &TaskDetails) -> String {
    let mut out = format!("- [{}] ", edited.status.marker());
    out.push_str(&single_line(&edited.title));

    if edited.priority != TaskPriority::None {
        out.push_str(&format!(" [priority::{}]", edited.priority));
    }

    if let Some(description) = edited.description.as_deref().filter(|d| !d.is_empty()) {
        let indent = lead_whitespace_for_column(start_column + 2);
        out.push_str("\n\n");
        let body = description
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{indent}{line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        out.push_str(&body);
    }

    out.trim_end().to_string()
}

fn single_line(title: &str) -> String {
    title
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace `base`'s span in `document` with the canonical form of `edited`.
///
/// Every byte outside `base.start_offset..base.end_offset` is preserved. The
/// returned task keeps `base`'s identity and start position; its end and hash
/// describe the new document.
pub fn rewrite_task(
    document: &str,
    base: &Task,
    edited: &TaskDetails,
) -> Result<RewriteOutput, RewriteError> {
    let (start, end) = (base.start_offset, base.end_offset);
    let (Some(prefix), Some(suffix)) = (document.get(..start), document.get(end..)) else {
        return Err(RewriteError::SpanOutOfBounds {
            start,
            end,
            len: document.len(),
        });
    };
    if start > end {
        return Err(RewriteError::SpanOutOfBounds {
            start,
            end,
            len: document.len(),
        });
    }

    let serialized = convert_task_to_markdown(base, edited);

    let mut new_document = String::with_capacity(prefix.len() + serialized.len() + suffix.len());
    new_document.push_str(prefix);
    new_document.push_str(&serialized);
    new_document.push_str(suffix);

    let end_offset = start + serialized.len();
    let task = Task {
        end_offset,
        end_line: count_lines(&new_document[..end_offset]),
        file_hash: FileHash::of(&new_document),
        ..base.with_details(edited.clone())
    };

    tracing::debug!(
        task_id = %task.id,
        old_end = end,
        new_end = end_offset,
        "rewrote task span"
    );

    Ok(RewriteOutput {
        document: new_document,
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_tasks;
    use crate::task::TaskStatus;
    use pretty_assertions::assert_eq;

    fn only_task(path: &str, text: &str) -> Task {
        let mut tasks = parse_tasks(path, text);
        assert_eq!(tasks.len(), 1, "expected one task in {text:?}");
        tasks.remove(0)
    }

    #[test]
    fn serializes_marker_title_and_priority() {
        let base = only_task("a.md", "- [ ] Buy milk\n");
        let edited = TaskDetails {
            title: "Buy oat\nmilk".into(),
            status: TaskStatus::InProgress,
            priority: TaskPriority::High,
            ..base.details()
        };
        assert_eq!(
            convert_task_to_markdown(&base, &edited),
            "- [>] Buy oat milk [priority::high]"
        );
    }

    #[test]
    fn description_is_indented_past_the_bullet() {
        let base = only_task("a.md", "- a\n  - b\n    - [ ] deep\n");
        assert_eq!(base.start_column, 4);
        let edited = TaskDetails {
            description: Some("first\n\nsecond   \n".into()),
            ..base.details()
        };
        assert_eq!(
            convert_task_to_markdown(&base, &edited),
            "- [ ] deep\n\n\t  first\n\n\t  second"
        );
    }

    #[test]
    fn empty_description_is_omitted() {
        let base = only_task("a.md", "- [x] Done\n");
        let edited = TaskDetails {
            description: Some(String::new()),
            ..base.details()
        };
        assert_eq!(convert_task_to_markdown(&base, &edited), "- [x] Done");
    }

    #[test]
    fn unchanged_task_reproduces_the_document() {
        let docs = [
            "- [ ] Buy milk\n- [x] Finish report\n",
            "# Notes\n\nintro\n\n- [ ] Pay rent [priority::high]\n- [?] Maybe\n\ntrailer\n",
            "\n- [ ] Install new lightswitch\n\n  The lightswitch we currently have is busted because it is a\n  dimmer switch that is not LED compatible. We now use LED lights.\n      ",
        ];
        for doc in docs {
            for task in parse_tasks("doc.md", doc) {
                let out = rewrite_task(doc, &task, &task.details()).unwrap();
                assert_eq!(out.document, doc);
                assert_eq!(out.task.end_offset, task.end_offset);
                assert_eq!(out.task.end_line, task.end_line);
                assert_eq!(out.task.file_hash, task.file_hash);
            }
        }
    }

    #[test]
    fn edit_survives_reparse() {
        let doc = "# Chores\n\n- [ ] Buy milk\n\nAfter the list.\n";
        let base = only_task("chores.md", doc);
        let edited = TaskDetails {
            title: "Buy bread".into(),
            priority: TaskPriority::Critical,
            status: TaskStatus::Review,
            ..base.details()
        };

        let out = rewrite_task(doc, &base, &edited).unwrap();
        assert_eq!(
            out.document,
            "# Chores\n\n- [=] Buy bread [priority::critical]\n\nAfter the list.\n"
        );

        let reparsed = only_task("chores.md", &out.document);
        assert_eq!(reparsed.title(), "Buy bread");
        assert_eq!(reparsed.priority(), TaskPriority::Critical);
        assert_eq!(reparsed.details.marker, TaskStatus::Review.marker());
        assert_eq!(reparsed.start_offset, out.task.start_offset);
        assert_eq!(reparsed.end_offset, out.task.end_offset);
        assert_eq!(reparsed.end_line, out.task.end_line);
        assert_eq!(reparsed.file_hash, out.task.file_hash);
        assert_eq!(out.task.id, base.id);
    }

    #[test]
    fn only_the_span_changes() {
        let doc = "- [ ] one\n- [ ] two\n- [ ] three\n";
        let tasks = parse_tasks("d.md", doc);
        let edited = TaskDetails {
            description: Some("details\nmore".into()),
            ..tasks[1].details()
        };
        let out = rewrite_task(doc, &tasks[1], &edited).unwrap();
        assert_eq!(
            out.document,
            "- [ ] one\n- [ ] two\n\n  details\n  more\n- [ ] three\n"
        );
        assert_eq!(out.task.end_line, 5);
    }

    #[test]
    fn span_outside_document_is_rejected() {
        let base = only_task("a.md", "- [ ] Buy milk\n");
        let err = rewrite_task("short", &base, &base.details()).unwrap_err();
        assert!(matches!(err, RewriteError::SpanOutOfBounds { len: 5, .. }));
    }
}
