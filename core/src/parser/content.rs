use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::task::{PrioritySet, TaskDetails, TaskPriority, TaskStatus};

const DEFAULT_PROJECT: &str = "default";
const DEFAULT_SECTION: &str = "default";

/// `[` + one marker character + `]` + at least one whitespace.
pub fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[([^\]])\]\s+").expect("marker regex"))
}

fn due_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)due: (\d{4}-\d{2}-\d{2})").expect("due regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#([a-zA-Z0-9_-]+)").expect("tag regex"))
}

fn annotation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)::([^\]]+)\]\s*").expect("annotation regex"))
}

/// The date of the first `due: YYYY-MM-DD` token in `text`.
pub fn parse_due_date(text: &str) -> Option<String> {
    due_regex().captures(text).map(|caps| caps[1].to_string())
}

/// Rewrite the `due: YYYY-MM-DD` token inside a task title.
///
/// An existing token is replaced in place, otherwise one is appended.
/// `None` removes the token. The date must be a real calendar day.
pub fn with_due_date(title: &str, due: Option<&str>) -> Result<String, String> {
    let Some(due) = due else {
        let stripped = due_regex().replace(title, "");
        return Ok(stripped.split_whitespace().collect::<Vec<_>>().join(" "));
    };

    let valid_shape = due.len() == 10 && due_regex().is_match(&format!("due: {due}"));
    if !valid_shape || chrono::NaiveDate::parse_from_str(due, "%Y-%m-%d").is_err() {
        return Err(format!("invalid due date: {due} (expected YYYY-MM-DD)"));
    }

    let token = format!("due: {due}");
    if due_regex().is_match(title) {
        Ok(due_regex().replace(title, token.as_str()).into_owned())
    } else if title.trim().is_empty() {
        Ok(token)
    } else {
        Ok(format!("{} {token}", title.trim_end()))
    }
}

/// Split a checkbox paragraph into its marker and the text after it.
pub fn split_marker(paragraph: &str) -> Option<(char, &str)> {
    let caps = marker_regex().captures(paragraph)?;
    let marker = caps.get(1)?.as_str().chars().next()?;
    let whole = caps.get(0)?;
    Some((marker, &paragraph[whole.end()..]))
}

/// `[key::value]` annotations, later keys overwriting earlier ones.
pub fn parse_annotations(text: &str) -> HashMap<String, String> {
    annotation_regex()
        .captures_iter(text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

fn clean_title(text: &str) -> String {
    let stripped = annotation_regex().replace_all(text, "");
    stripped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build task details from a checkbox paragraph (`[x] title ...`).
///
/// Returns `None` when the paragraph does not start with a checkbox marker.
pub fn parse_content(
    paragraph: &str,
    description: Option<String>,
    priorities: &PrioritySet,
) -> Option<TaskDetails> {
    let (marker, rest) = split_marker(paragraph)?;
    let status = TaskStatus::from_marker(marker).unwrap_or_default();

    let due_date = parse_due_date(rest);

    let tags = tag_regex()
        .captures_iter(rest)
        .map(|caps| caps[1].to_string())
        .collect();

    let annotations = parse_annotations(rest);
    let priority = annotations
        .get("priority")
        .and_then(|value| priorities.parse(value))
        .unwrap_or(TaskPriority::None);

    let now = chrono::Utc::now().to_rfc3339();

    Some(TaskDetails {
        title: clean_title(rest),
        description,
        marker,
        status,
        priority,
        project: DEFAULT_PROJECT.to_string(),
        section: DEFAULT_SECTION.to_string(),
        assignee: String::new(),
        due_date,
        created_at: now.clone(),
        updated_at: now,
        completed_at: None,
        subtasks: Vec::new(),
        dependencies: Vec::new(),
        tags,
    })
}
