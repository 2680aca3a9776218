use chrono::{DateTime, Utc};
use serde::Deserializer;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    /// Board column order.
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Todo
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Status::Todo),
            "in-progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

/// Task is a single to-do item on the board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub reminder: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Validates the submitted fields and stamps a fresh id and creation time.
    pub fn new(new_task: NewTask) -> Result<Task, ModelError> {
        let title = match new_task.title {
            Some(title) if !title.trim().is_empty() => title.trim().to_string(),
            _ => return Err(ModelError::TitleRequired),
        };

        Ok(Self {
            id: Uuid::new_v4().hyphenated().to_string(),
            title,
            status: new_task.status.unwrap_or_default(),
            due_date: normalize_due_date(new_task.due_date),
            reminder: new_task.reminder,
            created_at: Utc::now(),
        })
    }

    /// Applies only the fields present in the patch; `id` and `created_at` never change.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(due_date) = &patch.due_date {
            self.due_date = normalize_due_date(due_date.clone());
        }
        if let Some(reminder) = patch.reminder {
            self.reminder = reminder;
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }
}

/// Payload accepted when creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub reminder: bool,
}

impl NewTask {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }
}

/// Partial update. A missing field is left untouched, `"dueDate": null` clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_truthy")]
    pub reminder: Option<bool>,
}

impl TaskPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        match &self.title {
            Some(title) if title.trim().is_empty() => Err(ModelError::EmptyTitle),
            _ => Ok(()),
        }
    }
}

fn normalize_due_date(due_date: Option<String>) -> Option<String> {
    due_date.filter(|date| !date.is_empty())
}

// Loose boolean coercion: null, false, 0, NaN and "" are false, everything else is true.
fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = serde::Deserialize::deserialize(deserializer)?;
    Ok(coerce_bool(&value))
}

fn present_truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    truthy(deserializer).map(Some)
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}
