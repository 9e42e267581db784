use crate::model::{Phase, Schedule, Status, Task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Filter criteria a task list query was issued with.
///
/// Equal filters address the same cache partition, so every field takes part
/// in `Hash`/`Eq`. The empty filter is the "all tasks" partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
}

impl TaskFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.folder.is_none() && self.assignee.is_none()
    }

    /// Returns true if the task satisfies all active criteria.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(ref folder) = self.folder {
            if task.folder.as_deref() != Some(folder.as_str()) {
                return false;
            }
        }
        if let Some(ref assignee) = self.assignee {
            if !task.assignees.iter().any(|a| a == assignee) {
                return false;
            }
        }
        true
    }
}

/// Filter criteria a schedule list query was issued with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScheduleFilter {
    #[serde(default)]
    pub phase: Option<Phase>,
    #[serde(default)]
    pub attendee: Option<String>,
}

impl ScheduleFilter {
    /// Phase classification depends on the clock, so `now` is threaded in.
    #[must_use]
    pub fn matches(&self, schedule: &Schedule, now: DateTime<Utc>) -> bool {
        if let Some(phase) = self.phase {
            if schedule.phase(now) != phase {
                return false;
            }
        }
        if let Some(ref attendee) = self.attendee {
            if !schedule.attendees.iter().any(|a| a == attendee) {
                return false;
            }
        }
        true
    }
}

/// Addressable cache partition: entity kind plus the filter it was fetched
/// with. The `Display` form is the stable key used in log lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Tasks(TaskFilter),
    Schedules(ScheduleFilter),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tasks(filter) => {
                write!(f, "tasks")?;
                let mut sep = '?';
                if let Some(status) = filter.status {
                    write!(f, "{sep}status={status}")?;
                    sep = '&';
                }
                if let Some(ref folder) = filter.folder {
                    write!(f, "{sep}folder={folder}")?;
                    sep = '&';
                }
                if let Some(ref assignee) = filter.assignee {
                    write!(f, "{sep}assignee={assignee}")?;
                }
                Ok(())
            }
            Self::Schedules(filter) => {
                write!(f, "schedules")?;
                let mut sep = '?';
                if let Some(phase) = filter.phase {
                    write!(f, "{sep}phase={phase}")?;
                    sep = '&';
                }
                if let Some(ref attendee) = filter.attendee {
                    write!(f, "{sep}attendee={attendee}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheKey, ScheduleFilter, TaskFilter};
    use crate::model::{EntityId, Status, Task};

    fn task(status: Status, folder: Option<&str>, assignees: &[&str]) -> Task {
        Task {
            id: EntityId::from("tsk-1"),
            title: "t".into(),
            assignees: assignees.iter().map(|s| (*s).to_string()).collect(),
            due: None,
            status,
            folder: folder.map(String::from),
            ai: None,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = TaskFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&task(Status::New, None, &[])));
        assert!(filter.matches(&task(Status::Completed, Some("work"), &["bo"])));
    }

    #[test]
    fn filter_criteria_all_have_to_hold() {
        let filter = TaskFilter {
            status: Some(Status::Urgent),
            folder: Some("work".into()),
            assignee: Some("ann".into()),
        };
        assert!(filter.matches(&task(Status::Urgent, Some("work"), &["ann", "bo"])));
        assert!(!filter.matches(&task(Status::New, Some("work"), &["ann"])));
        assert!(!filter.matches(&task(Status::Urgent, Some("home"), &["ann"])));
        assert!(!filter.matches(&task(Status::Urgent, Some("work"), &["bo"])));
    }

    #[test]
    fn folder_filter_excludes_unfiled_tasks() {
        let filter = TaskFilter {
            folder: Some("work".into()),
            ..TaskFilter::default()
        };
        assert!(!filter.matches(&task(Status::New, None, &[])));
    }

    #[test]
    fn key_display_is_stable() {
        let key = CacheKey::Tasks(TaskFilter {
            status: Some(Status::InProgress),
            folder: Some("work".into()),
            assignee: None,
        });
        assert_eq!(key.to_string(), "tasks?status=in_progress&folder=work");
        assert_eq!(
            CacheKey::Schedules(ScheduleFilter::default()).to_string(),
            "schedules"
        );
    }
}
