use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::task::Priority;

pub const MAX_TITLE_LEN: usize = 100;

const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,
    #[error("Title too long (max {})", MAX_TITLE_LEN)]
    TitleTooLong,
    #[error("Invalid priority")]
    InvalidPriority,
    #[error("Invalid dueDate")]
    InvalidDueDate,
    #[error("completed must be boolean")]
    InvalidType,
}

/// Returns the trimmed title, or why it cannot be stored.
pub fn validate_title(title: Option<&str>) -> Result<String, ValidationError> {
    let trimmed = title.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(trimmed.to_string())
}

/// Priority as given on creation: missing or empty means `Medium`.
pub fn validate_priority(priority: Option<&str>) -> Result<Priority, ValidationError> {
    match priority {
        None | Some("") => Ok(Priority::Medium),
        Some(value) => value.parse(),
    }
}

/// Priority as given on update: there is no default, missing input is rejected.
pub fn validate_required_priority(priority: Option<&str>) -> Result<Priority, ValidationError> {
    priority.unwrap_or_default().parse()
}

/// Parses an optional due date. Empty or missing input clears the date.
pub fn parse_due_date(due_date: Option<&str>) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let raw = match due_date {
        None | Some("") => return Ok(None),
        Some(raw) => raw.trim(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(parsed.and_utc()));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Some(midnight.and_utc()))
        .ok_or(ValidationError::InvalidDueDate)
}

pub fn validate_completed(completed: &Value) -> Result<bool, ValidationError> {
    completed.as_bool().ok_or(ValidationError::InvalidType)
}
