use super::id::EntityId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The four task statuses, one board column each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    New,
    InProgress,
    Urgent,
    Completed,
}

impl Status {
    /// Board column order, left to right.
    pub const ALL: [Self; 4] = [Self::New, Self::InProgress, Self::Urgent, Self::Completed];

    const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Urgent => "urgent",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Checkbox-style toggle: anything open completes, completed reopens.
    ///
    /// The prior status is not remembered; a reopened task always lands in
    /// `new` (the remote stores only the current status).
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Completed => Self::New,
            Self::New | Self::InProgress | Self::Urgent => Self::Completed,
        }
    }
}

/// AI-generated annotation attached to a task or schedule by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnnotation {
    pub summary: String,
    pub confidence: f64,
}

/// A task as held by the query cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    pub status: Status,
    /// Folder grouping; `None` means the task is unfiled.
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub ai: Option<AiAnnotation>,
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "urgent" => Ok(Self::Urgent),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Status, Task};
    use crate::model::id::EntityId;
    use std::str::FromStr;

    #[test]
    fn status_json_roundtrips() {
        assert_eq!(serde_json::to_string(&Status::New).unwrap(), "\"new\"");
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::from_str::<Status>("\"urgent\"").unwrap(),
            Status::Urgent
        );
    }

    #[test]
    fn status_display_parse_roundtrips() {
        for status in Status::ALL {
            let rendered = status.to_string();
            assert_eq!(Status::from_str(&rendered).unwrap(), status);
        }
    }

    #[test]
    fn parse_rejects_unknown_status() {
        assert!(Status::from_str("blocked").is_err());
        assert!(Status::from_str("").is_err());
    }

    #[test]
    fn toggle_completes_and_reopens() {
        assert_eq!(Status::New.toggled(), Status::Completed);
        assert_eq!(Status::InProgress.toggled(), Status::Completed);
        assert_eq!(Status::Urgent.toggled(), Status::Completed);
        assert_eq!(Status::Completed.toggled(), Status::New);
    }

    #[test]
    fn task_json_omits_empty_optionals_on_default() {
        let json = r#"{"id":"tsk-1","title":"Write report","status":"new"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, EntityId::from("tsk-1"));
        assert!(task.assignees.is_empty());
        assert!(task.due.is_none());
        assert!(task.folder.is_none());
        assert!(task.ai.is_none());
    }
}
