use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use super::priority::TaskPriority;
use super::status::TaskStatus;

/// SHA-256 digest of the exact document text a task was parsed from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileHash([u8; 32]);

impl FileHash {
    pub fn of(text: &str) -> Self {
        Self(Sha256::digest(text.as_bytes()).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for FileHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileHash({})", self)
    }
}

impl Serialize for FileHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for FileHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&s, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}

/// Editable projection of a [`Task`]: everything except identity, position
/// and the document hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    pub title: String,
    pub description: Option<String>,
    pub marker: char,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub project: String,
    pub section: String,
    pub assignee: String,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Task>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Default for TaskDetails {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            marker: TaskStatus::None.marker(),
            status: TaskStatus::None,
            priority: TaskPriority::None,
            project: String::new(),
            section: String::new(),
            assignee: String::new(),
            due_date: None,
            created_at: String::new(),
            updated_at: String::new(),
            completed_at: None,
            subtasks: Vec::new(),
            dependencies: Vec::new(),
            tags: Vec::new(),
        }
    }
}

/// One checkbox list item, with the span it occupies in its document.
///
/// Lines are 1-based, columns and offsets are 0-based byte positions.
/// `end_offset` is exclusive. The span is only meaningful together with the
/// document text whose hash equals `file_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub path: String,
    pub start_line: usize,
    pub start_column: usize,
    pub start_offset: usize,
    pub end_line: usize,
    pub end_offset: usize,
    pub file_hash: FileHash,
    #[serde(flatten)]
    pub details: TaskDetails,
}

impl Task {
    /// Identity derived from the document path and the byte offset of the
    /// checkbox paragraph. It changes whenever earlier content shifts.
    pub fn make_id(path: &str, offset: usize) -> String {
        format!("{path}:{offset}")
    }

    pub fn span(&self) -> Range<usize> {
        self.start_offset..self.end_offset
    }

    pub fn details(&self) -> TaskDetails {
        self.details.clone()
    }

    /// New task carrying this task's identity and position with `details`
    /// replacing every editable field.
    pub fn with_details(&self, details: TaskDetails) -> Task {
        Task {
            details,
            ..self.clone()
        }
    }

    pub fn title(&self) -> &str {
        &self.details.title
    }

    pub fn status(&self) -> TaskStatus {
        self.details.status
    }

    pub fn priority(&self) -> TaskPriority {
        self.details.priority
    }
}
