use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => f.write_str("Pending"),
            TaskStatus::Completed => f.write_str("Completed"),
        }
    }
}

/// Task as listed by the manager and employee task endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub task_title: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub task_description: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub due_date: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_by_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TasksResponse {
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub tasks: Vec<Task>,
}

/// Body of `POST /api/manager/assign-task`. A broadcast goes to the whole
/// team and carries no assignee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub task_title: String,
    pub task_description: String,
    pub due_date: String,
    pub priority: Priority,
    pub assigned_to_id: Option<String>,
    pub is_broadcast: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: TaskStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_serializes_null_assignee() {
        let task = NewTask {
            task_title: "Quarterly goals".into(),
            task_description: "Draft and share".into(),
            due_date: "2026-11-01".into(),
            priority: Priority::High,
            assigned_to_id: None,
            is_broadcast: true,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["assigned_to_id"], serde_json::Value::Null);
        assert_eq!(value["priority"], "High");
    }

    #[test]
    fn status_toggles() {
        assert_eq!(TaskStatus::Pending.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::Pending);
    }

    #[test]
    fn null_task_fields_fall_back_to_defaults() {
        let task: Task = serde_json::from_str(
            r#"{"_id":"t1","task_title":"Review","task_description":null,"priority":null,"status":null}"#,
        )
        .unwrap();
        assert_eq!(task.task_description, "");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.status, TaskStatus::Pending);
    }
}
