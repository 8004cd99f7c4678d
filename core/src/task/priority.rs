use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskPriority {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
    Wish,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 6] = [
        TaskPriority::None,
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Critical,
        TaskPriority::Wish,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::None => "none",
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Critical => "critical",
            TaskPriority::Wish => "wish",
        }
    }

    fn from_name(name: &str) -> Option<TaskPriority> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of priorities a document may use.
///
/// Two priority vocabularies exist in the wild, one of which carries an
/// extra `wish` level. The set is configurable so the parser only accepts
/// what the deployment agreed on; `none` is always a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrioritySet(Vec<TaskPriority>);

impl Default for PrioritySet {
    fn default() -> Self {
        Self(vec![
            TaskPriority::None,
            TaskPriority::Low,
            TaskPriority::Medium,
            TaskPriority::High,
            TaskPriority::Critical,
        ])
    }
}

impl PrioritySet {
    pub fn new(members: impl IntoIterator<Item = TaskPriority>) -> Self {
        let mut set = vec![TaskPriority::None];
        for p in members {
            if !set.contains(&p) {
                set.push(p);
            }
        }
        Self(set)
    }

    pub fn with_wish() -> Self {
        let mut set = Self::default();
        set.0.push(TaskPriority::Wish);
        set
    }

    pub fn contains(&self, priority: TaskPriority) -> bool {
        self.0.contains(&priority)
    }

    pub fn members(&self) -> &[TaskPriority] {
        &self.0
    }

    /// Parse a priority name, accepting only members of this set.
    pub fn parse(&self, name: &str) -> Option<TaskPriority> {
        TaskPriority::from_name(name).filter(|p| self.contains(*p))
    }
}
