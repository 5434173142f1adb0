use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::task::{Priority, TaskId};

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Kept as a raw value so a non-boolean can be reported instead of failing to decode.
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateCompletedRequest {
    #[serde(default)]
    pub completed: Value,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateTitleRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdatePriorityRequest {
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDueDateRequest {
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct CompletedUpdated {
    pub id: TaskId,
    pub completed: bool,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct TitleUpdated {
    pub id: TaskId,
    pub title: String,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct PriorityUpdated {
    pub id: TaskId,
    pub priority: Priority,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DueDateUpdated {
    pub id: TaskId,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct TaskDeleted {
    pub id: TaskId,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
