//! Task DTOs exchanged with the backend

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-assigned task identifier
pub type TaskId = i64;

/// Lifecycle status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Every status in workflow order
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Wire representation (`in_progress`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// The status a task advances to, or `None` once completed
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Completed => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// A task as returned by `GET /tasks/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 0 = low, 1 = medium, 2 = high
    pub priority: i64,
    #[serde(default)]
    pub due_date: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Copy this task into an update with no due date set.
    ///
    /// Absent fields are never sent, so the stored due date stays as it is
    /// until the caller supplies a new one.
    #[must_use]
    pub fn retask(&self) -> TaskUpdate {
        TaskUpdate {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            priority: Some(self.priority),
            due_date: None,
            status: Some(self.status),
        }
    }
}

/// Body of `POST /tasks/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// Body of `PATCH /tasks/{id}`; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskUpdate {
    /// Update that only changes the status
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Whether the update carries no fields at all
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
    }
}

/// Response of `POST /tasks/import`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let parsed: TaskStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, TaskStatus::Completed);
    }

    #[test]
    fn status_walks_forward_and_stops() {
        assert_eq!(TaskStatus::Pending.next(), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::InProgress.next(), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::Completed.next(), None);
    }

    #[test]
    fn status_parses_loose_spellings() {
        assert_eq!("In Progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn task_tolerates_null_optionals() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": "Write report",
            "description": null,
            "priority": 2,
            "due_date": null,
            "status": "pending",
            "owner_id": null,
            "completed": false
        }))
        .unwrap();

        assert_eq!(task.id, 7);
        assert!(task.description.is_none());
        assert!(task.due_date.is_none());
    }

    #[test]
    fn partial_update_omits_absent_fields() {
        let update = TaskUpdate::status(TaskStatus::Completed);
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "completed" }));
        assert!(!update.is_empty());
        assert!(TaskUpdate::default().is_empty());
    }

    #[test]
    fn retask_leaves_due_date_to_the_caller() {
        let task = Task {
            id: 1,
            title: "Ship".into(),
            description: Some("release notes".into()),
            priority: 1,
            due_date: Some("2024-01-01".into()),
            status: TaskStatus::InProgress,
            owner_id: Some(3),
            completed: false,
        };

        let update = task.retask();
        assert_eq!(update.title.as_deref(), Some("Ship"));
        assert_eq!(update.priority, Some(1));
        assert!(update.due_date.is_none());
        assert_eq!(update.status, Some(TaskStatus::InProgress));

        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("due_date").is_none());
    }
}
