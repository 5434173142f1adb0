use async_trait::async_trait;
use parking_lot::RwLock;
use taskdeck_shared::{Task, TaskField};

use super::{new_task_id, sort_newest_first, NewTask, RepoResult, RepositoryError, TaskRepository};

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut tasks = self.tasks.read().clone();
        sort_newest_first(&mut tasks);
        Ok(tasks)
    }

    async fn create_task(&self, task: NewTask) -> RepoResult<Task> {
        let task = task.into_task(new_task_id());
        self.tasks.write().push(task.clone());
        Ok(task)
    }

    async fn update_field(&self, id: &str, field: TaskField) -> RepoResult<()> {
        let mut tasks = self.tasks.write();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        task.apply(&field);
        Ok(())
    }

    async fn delete_task(&self, id: &str) -> RepoResult<()> {
        self.tasks.write().retain(|t| t.id != id);
        Ok(())
    }
}
