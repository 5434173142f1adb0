use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Opaque identifier assigned by the store on creation.
pub type TaskId = String;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Every priority, most severe first.
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// The next priority in `ALL`, wrapping around after `Low`.
    pub fn next(self) -> Priority {
        let index = Priority::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Priority::ALL[(index + 1) % Priority::ALL.len()]
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ValidationError::InvalidPriority),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn apply(&mut self, field: &TaskField) {
        match field {
            TaskField::Completed(completed) => self.completed = *completed,
            TaskField::Title(title) => self.title = title.clone(),
            TaskField::Priority(priority) => self.priority = *priority,
            TaskField::DueDate(due_date) => self.due_date = *due_date,
        }
    }
}

/// A single-field mutation. Tasks are never updated as a whole.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskField {
    Completed(bool),
    Title(String),
    Priority(Priority),
    DueDate(Option<DateTime<Utc>>),
}

impl TaskField {
    pub fn name(&self) -> &'static str {
        match self {
            TaskField::Completed(_) => "completed",
            TaskField::Title(_) => "title",
            TaskField::Priority(_) => "priority",
            TaskField::DueDate(_) => "dueDate",
        }
    }
}
