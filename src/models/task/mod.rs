// Task module
// Partial view of tasks and projects owned by the external task store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Pomodoro,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Pomodoro => "pomodoro",
            TaskStatus::Completed => "completed",
        }
    }

    /// Parse a stored status, treating unknown values as `Todo`
    pub fn from_str_or_todo(value: &str) -> Self {
        match value {
            "pomodoro" => TaskStatus::Pomodoro,
            "completed" => TaskStatus::Completed,
            _ => TaskStatus::Todo,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

/// A task record with its optional schedule.
///
/// Two generations of schedule fields exist side by side: the legacy
/// local `scheduled_date` + `HH:MM` strings, and UTC instants written by
/// newer clients. Readers prefer the UTC pair when both ends are present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    /// `HH:MM`, 24-hour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_end_time: Option<String>,
    #[serde(default)]
    pub include_time: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_start_utc: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_end_utc: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_date
            .as_deref()
            .map(|date| !date.trim().is_empty())
            .unwrap_or(false)
    }

    /// Apply a partial update the way the task store would.
    pub fn apply_update(&mut self, update: &TaskUpdate) {
        if let Some(date) = &update.scheduled_date {
            self.scheduled_date = Some(date.clone());
        }
        if let Some(start) = &update.scheduled_start_time {
            self.scheduled_start_time = start.clone();
        }
        if let Some(end) = &update.scheduled_end_time {
            self.scheduled_end_time = end.clone();
        }
        if let Some(include_time) = update.include_time {
            self.include_time = include_time;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(start) = update.scheduled_start_utc {
            self.scheduled_start_utc = start;
        }
        if let Some(end) = update.scheduled_end_utc {
            self.scheduled_end_utc = end;
        }
    }
}

/// Project a task belongs to; only used for color lookup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Partial update accepted by `TaskStore::update_task`.
///
/// Nested options are tri-state: `None` leaves the field alone,
/// `Some(None)` clears it (serialized as `null`), `Some(Some(v))` sets it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_start_time: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_end_time: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_time: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_start_utc: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_end_utc: Option<Option<DateTime<Utc>>>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self == &TaskUpdate::default()
    }
}
