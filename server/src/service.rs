//! Task gateway: validates input, forwards single-field changes to the
//! repository and turns storage failures into generic service errors.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use taskdeck_shared::{
    parse_due_date, validate_completed, validate_priority, validate_required_priority,
    validate_title, CompletedUpdated, CreateTaskRequest, DueDateUpdated, PriorityUpdated, Task,
    TaskDeleted, TaskField, TitleUpdated,
};

use crate::error::ApiError;
use crate::repository::{NewTask, RepositoryError, TaskRepository};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> ApiResult<Vec<Task>> {
        self.repository
            .list_tasks()
            .await
            .map_err(|err| service_error("Error fetching tasks", "Failed to fetch tasks", err))
    }

    pub async fn create(&self, request: CreateTaskRequest) -> ApiResult<Task> {
        let title = validate_title(request.title.as_deref())?;
        let priority = validate_priority(request.priority.as_deref())?;
        let due_date = parse_due_date(request.due_date.as_deref())?;

        let task = NewTask {
            title,
            priority,
            due_date,
            completed: false,
            created_at: Utc::now(),
        };

        let created = self
            .repository
            .create_task(task)
            .await
            .map_err(|err| service_error("Error creating task", "Failed to create task", err))?;
        log::info!("created task {}", created.id);
        Ok(created)
    }

    pub async fn set_completed(&self, id: &str, completed: &Value) -> ApiResult<CompletedUpdated> {
        let completed = validate_completed(completed)?;
        self.update(
            id,
            TaskField::Completed(completed),
            "Error updating task",
            "Failed to update task",
        )
        .await?;
        Ok(CompletedUpdated {
            id: id.to_string(),
            completed,
        })
    }

    pub async fn rename(&self, id: &str, title: Option<&str>) -> ApiResult<TitleUpdated> {
        let title = validate_title(title)?;
        self.update(
            id,
            TaskField::Title(title.clone()),
            "Error updating title",
            "Failed to update title",
        )
        .await?;
        Ok(TitleUpdated {
            id: id.to_string(),
            title,
        })
    }

    pub async fn reprioritize(
        &self,
        id: &str,
        priority: Option<&str>,
    ) -> ApiResult<PriorityUpdated> {
        let priority = validate_required_priority(priority)?;
        self.update(
            id,
            TaskField::Priority(priority),
            "Error updating priority",
            "Failed to update priority",
        )
        .await?;
        Ok(PriorityUpdated {
            id: id.to_string(),
            priority,
        })
    }

    pub async fn reschedule(&self, id: &str, due_date: Option<&str>) -> ApiResult<DueDateUpdated> {
        let due_date = parse_due_date(due_date)?;
        self.update(
            id,
            TaskField::DueDate(due_date),
            "Error updating dueDate",
            "Failed to update dueDate",
        )
        .await?;
        Ok(DueDateUpdated {
            id: id.to_string(),
            due_date,
        })
    }

    pub async fn delete(&self, id: &str) -> ApiResult<TaskDeleted> {
        self.repository
            .delete_task(id)
            .await
            .map_err(|err| service_error("Error deleting task", "Failed to delete task", err))?;
        Ok(TaskDeleted { id: id.to_string() })
    }

    async fn update(
        &self,
        id: &str,
        field: TaskField,
        context: &str,
        public_message: &'static str,
    ) -> ApiResult<()> {
        let name = field.name();
        self.repository
            .update_field(id, field)
            .await
            .map_err(|err| service_error(context, public_message, err))?;
        log::debug!("updated {name} of task {id}");
        Ok(())
    }
}

fn service_error(context: &str, public_message: &'static str, err: RepositoryError) -> ApiError {
    log::error!("{context}: {err}");
    ApiError::Service(public_message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryTaskRepository, RepoResult};
    use async_trait::async_trait;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use taskdeck_shared::{Priority, ValidationError};

    fn outage() -> RepositoryError {
        RepositoryError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))
    }

    struct UnavailableRepository;

    #[async_trait]
    impl TaskRepository for UnavailableRepository {
        async fn list_tasks(&self) -> RepoResult<Vec<Task>> {
            Err(outage())
        }
        async fn create_task(&self, _task: NewTask) -> RepoResult<Task> {
            Err(outage())
        }
        async fn update_field(&self, _id: &str, _field: TaskField) -> RepoResult<()> {
            Err(outage())
        }
        async fn delete_task(&self, _id: &str) -> RepoResult<()> {
            Err(outage())
        }
    }

    #[fixture]
    fn repository() -> Arc<InMemoryTaskRepository> {
        Arc::new(InMemoryTaskRepository::new())
    }

    fn create_request(
        title: &str,
        priority: Option<&str>,
        due_date: Option<&str>,
    ) -> CreateTaskRequest {
        CreateTaskRequest {
            title: Some(title.to_string()),
            priority: priority.map(str::to_string),
            due_date: due_date.map(str::to_string),
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn create_trims_and_applies_defaults(repository: Arc<InMemoryTaskRepository>) {
        let service = TaskService::new(repository.clone());

        let task = service
            .create(create_request("  Buy milk  ", None, None))
            .await
            .unwrap();

        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.due_date, None);
        assert!(!task.completed);
        assert_eq!(repository.list_tasks().await.unwrap(), vec![task]);
    }

    #[rstest]
    #[actix_web::test]
    async fn create_rejects_without_writing(repository: Arc<InMemoryTaskRepository>) {
        let service = TaskService::new(repository.clone());

        let err = service
            .create(create_request("ok", Some("urgent"), None))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Validation(ValidationError::InvalidPriority));

        let err = service
            .create(create_request("ok", None, Some("someday")))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Validation(ValidationError::InvalidDueDate));

        assert!(repository.list_tasks().await.unwrap().is_empty());
    }

    #[rstest]
    #[actix_web::test]
    async fn field_updates_are_validated(repository: Arc<InMemoryTaskRepository>) {
        let service = TaskService::new(repository.clone());
        let task = service.create(create_request("a", None, None)).await.unwrap();

        assert_eq!(
            service.set_completed(&task.id, &json!("yes")).await,
            Err(ApiError::Validation(ValidationError::InvalidType))
        );
        assert_eq!(
            service.rename(&task.id, Some("   ")).await,
            Err(ApiError::Validation(ValidationError::EmptyTitle))
        );
        assert_eq!(
            service.reprioritize(&task.id, None).await,
            Err(ApiError::Validation(ValidationError::InvalidPriority))
        );
        assert_eq!(repository.list_tasks().await.unwrap(), vec![task]);
    }

    #[rstest]
    #[actix_web::test]
    async fn field_updates_persist_one_field_each(repository: Arc<InMemoryTaskRepository>) {
        let service = TaskService::new(repository.clone());
        let task = service.create(create_request("a", None, None)).await.unwrap();

        service.set_completed(&task.id, &json!(true)).await.unwrap();
        let renamed = service.rename(&task.id, Some(" b ")).await.unwrap();
        let reprioritized = service.reprioritize(&task.id, Some("LOW")).await.unwrap();
        let rescheduled = service
            .reschedule(&task.id, Some("2024-07-01"))
            .await
            .unwrap();

        assert_eq!(renamed.title, "b");
        assert_eq!(reprioritized.priority, Priority::Low);

        let stored = &repository.list_tasks().await.unwrap()[0];
        assert!(stored.completed);
        assert_eq!(stored.title, "b");
        assert_eq!(stored.priority, Priority::Low);
        assert_eq!(stored.due_date, rescheduled.due_date);
        assert_eq!(stored.created_at, task.created_at);

        let cleared = service.reschedule(&task.id, None).await.unwrap();
        assert_eq!(cleared.due_date, None);
        assert_eq!(repository.list_tasks().await.unwrap()[0].due_date, None);
    }

    #[rstest]
    #[actix_web::test]
    async fn updating_a_missing_task_is_a_service_error(repository: Arc<InMemoryTaskRepository>) {
        let service = TaskService::new(repository);
        assert_eq!(
            service.rename("ghost", Some("x")).await,
            Err(ApiError::Service("Failed to update title"))
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn delete_twice_succeeds(repository: Arc<InMemoryTaskRepository>) {
        let service = TaskService::new(repository);
        let task = service.create(create_request("a", None, None)).await.unwrap();

        assert_eq!(service.delete(&task.id).await.unwrap().id, task.id);
        assert_eq!(service.delete(&task.id).await.unwrap().id, task.id);
    }

    #[actix_web::test]
    async fn store_failures_hide_details() {
        let service = TaskService::new(Arc::new(UnavailableRepository));

        assert_eq!(
            service.list().await,
            Err(ApiError::Service("Failed to fetch tasks"))
        );
        assert_eq!(
            service.create(create_request("a", None, None)).await,
            Err(ApiError::Service("Failed to create task"))
        );
        assert_eq!(
            service.set_completed("x", &json!(false)).await,
            Err(ApiError::Service("Failed to update task"))
        );
        assert_eq!(
            service.reschedule("x", None).await,
            Err(ApiError::Service("Failed to update dueDate"))
        );
        assert_eq!(
            service.delete("x").await,
            Err(ApiError::Service("Failed to delete task"))
        );
    }
}
