//! Persistence boundary for tasks.
//!
//! Handlers and the service only see [`TaskRepository`]; which backend sits
//! behind it is decided once at startup.

mod file;
mod memory;

pub use file::JsonFileTaskRepository;
pub use memory::InMemoryTaskRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use taskdeck_shared::{Priority, Task, TaskField, TaskId};
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored document is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A validated task that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            priority: self.priority,
            due_date: self.due_date,
            completed: self.completed,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All tasks, newest `created_at` first.
    async fn list_tasks(&self) -> RepoResult<Vec<Task>>;

    async fn create_task(&self, task: NewTask) -> RepoResult<Task>;

    /// Fails with `NotFound` when no task has this id.
    async fn update_field(&self, id: &str, field: TaskField) -> RepoResult<()>;

    /// Succeeds whether or not the task existed.
    async fn delete_task(&self, id: &str) -> RepoResult<()>;
}

pub(crate) fn new_task_id() -> TaskId {
    uuid::Uuid::new_v4().simple().to_string()
}

pub(crate) fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
