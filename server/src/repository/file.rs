//! Document-file backend.
//!
//! The whole collection lives in one JSON document (`{"tasks": [...]}`).
//! Every mutation reads the document, changes it and writes it back through
//! a temp file + rename, serialised by a single async lock.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taskdeck_shared::{Task, TaskField};
use tokio::fs;
use tokio::sync::Mutex;

use super::{new_task_id, sort_newest_first, NewTask, RepoResult, RepositoryError, TaskRepository};

#[derive(Debug, Default, Serialize, Deserialize)]
struct TaskDocument {
    #[serde(default)]
    tasks: Vec<Task>,
}

pub struct JsonFileTaskRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileTaskRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> RepoResult<TaskDocument> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(TaskDocument::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(TaskDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, document: &TaskDocument) -> RepoResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_vec_pretty(document)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, content).await?;
        fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for JsonFileTaskRepository {
    async fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let _guard = self.lock.lock().await;
        let mut tasks = self.read_document().await?.tasks;
        sort_newest_first(&mut tasks);
        Ok(tasks)
    }

    async fn create_task(&self, task: NewTask) -> RepoResult<Task> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        let task = task.into_task(new_task_id());
        document.tasks.push(task.clone());
        self.write_document(&document).await?;
        log::debug!("stored task {} in {}", task.id, self.path.display());
        Ok(task)
    }

    async fn update_field(&self, id: &str, field: TaskField) -> RepoResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        let task = document
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        task.apply(&field);
        self.write_document(&document).await
    }

    async fn delete_task(&self, id: &str) -> RepoResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        let before = document.tasks.len();
        document.tasks.retain(|t| t.id != id);
        if document.tasks.len() == before {
            return Ok(());
        }
        self.write_document(&document).await
    }
}
