use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Workflow state of a task, written as the single character between the
/// checkbox brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    None,
    Planned,
    InProgress,
    Review,
    Abandoned,
    Closed,
}

pub const OPEN_STATUSES: [TaskStatus; 4] = [
    TaskStatus::None,
    TaskStatus::Planned,
    TaskStatus::InProgress,
    TaskStatus::Review,
];

pub const CLOSED_STATUSES: [TaskStatus; 2] = [TaskStatus::Abandoned, TaskStatus::Closed];

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::None,
        TaskStatus::Planned,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Abandoned,
        TaskStatus::Closed,
    ];

    /// Markers accepted when reading a document. The first entry is the
    /// canonical marker used when writing.
    pub fn read_markers(self) -> &'static [char] {
        match self {
            TaskStatus::None => &[' '],
            TaskStatus::Planned => &['?'],
            TaskStatus::InProgress => &['>', '/'],
            TaskStatus::Review => &['='],
            TaskStatus::Abandoned => &['-'],
            TaskStatus::Closed => &['x', 'X'],
        }
    }

    /// Canonical write marker.
    pub fn marker(self) -> char {
        self.read_markers()[0]
    }

    pub fn from_marker(marker: char) -> Option<TaskStatus> {
        Self::ALL
            .into_iter()
            .find(|status| status.read_markers().contains(&marker))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::None => "none",
            TaskStatus::Planned => "planned",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Abandoned => "abandoned",
            TaskStatus::Closed => "closed",
        }
    }

    pub fn is_open(self) -> bool {
        OPEN_STATUSES.contains(&self)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown task status: {s}"))
    }
}
