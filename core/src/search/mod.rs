//! Task filtering and the search box query syntax.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskStatus, CLOSED_STATUSES, OPEN_STATUSES};

/// Filter accepted by [`TaskStore::query_all`](crate::store::TaskStore::query_all).
///
/// Empty lists do not constrain. Keywords and paths are case-insensitive
/// substrings that must all match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub statuses: Vec<TaskStatus>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub paths: Vec<String>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.keywords.is_empty() && self.paths.is_empty()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&task.status()) {
            return false;
        }
        contains_all(task.title(), &self.keywords) && contains_all(&task.path, &self.paths)
    }
}

fn contains_all(haystack: &str, needles: &[String]) -> bool {
    if needles.is_empty() {
        return true;
    }
    let haystack = haystack.to_lowercase();
    needles
        .iter()
        .all(|needle| haystack.contains(&needle.to_lowercase()))
}

fn operator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w:").expect("operator regex"))
}

/// Turn a search box string into a filter.
///
/// Tokens containing `word:` are operators (`is:open`, `is:closed`,
/// `status:<name>`, `file:<text>`, `path:<text>`); unknown operators are
/// ignored. Everything else is a title keyword.
pub fn parse_query(query: &str) -> TaskFilter {
    let mut filter = TaskFilter::default();

    for token in query.split_whitespace() {
        if !operator_regex().is_match(token) {
            filter.keywords.push(token.to_string());
            continue;
        }

        let (key, value) = token.split_once(':').unwrap_or((token, ""));
        match key {
            "is" => match value {
                "open" => filter.statuses.extend(OPEN_STATUSES),
                "closed" => filter.statuses.extend(CLOSED_STATUSES),
                _ => {}
            },
            "status" => {
                if let Ok(status) = value.parse::<TaskStatus>() {
                    filter.statuses.push(status);
                }
            }
            "file" | "path" if !value.is_empty() => filter.paths.push(value.to_string()),
            _ => {}
        }
    }

    filter
}
