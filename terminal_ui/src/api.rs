use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use taskdeck_shared::{
    CompletedUpdated, CreateTaskRequest, DueDateUpdated, ErrorResponse, Priority,
    PriorityUpdated, Task, TaskDeleted, TitleUpdated, UpdateCompletedRequest,
    UpdateDueDateRequest, UpdatePriorityRequest, UpdateTitleRequest,
};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status and (usually) an `{error}` body.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("invalid API url: {0}")]
    Url(#[from] url::ParseError),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Remote operations the client performs against the task API.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self) -> ClientResult<Vec<Task>>;
    async fn create_task(&self, request: &CreateTaskRequest) -> ClientResult<Task>;
    async fn set_completed(&self, id: &str, completed: bool) -> ClientResult<CompletedUpdated>;
    async fn rename(&self, id: &str, title: &str) -> ClientResult<TitleUpdated>;
    async fn set_priority(&self, id: &str, priority: Priority) -> ClientResult<PriorityUpdated>;
    async fn set_due_date(
        &self,
        id: &str,
        due_date: Option<DateTime<Utc>>,
    ) -> ClientResult<DueDateUpdated>;
    async fn delete_task(&self, id: &str) -> ClientResult<TaskDeleted>;
}

/// Upper bound for a single request, so a stalled server cannot pin a
/// pending change forever.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct HttpTaskApi {
    client: Client,
    base: Url,
}

impl HttpTaskApi {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path)?)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string(),
    };
    log::warn!("server answered {status}: {message}");
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self) -> ClientResult<Vec<Task>> {
        let response = self.client.get(self.endpoint("tasks")?).send().await?;
        decode(response).await
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> ClientResult<Task> {
        let response = self
            .client
            .post(self.endpoint("tasks")?)
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    async fn set_completed(&self, id: &str, completed: bool) -> ClientResult<CompletedUpdated> {
        let body = UpdateCompletedRequest {
            completed: Value::Bool(completed),
        };
        let response = self
            .client
            .patch(self.endpoint(&format!("tasks/{id}"))?)
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    async fn rename(&self, id: &str, title: &str) -> ClientResult<TitleUpdated> {
        let body = UpdateTitleRequest {
            title: Some(title.to_string()),
        };
        let response = self
            .client
            .patch(self.endpoint(&format!("tasks/{id}/title"))?)
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    async fn set_priority(&self, id: &str, priority: Priority) -> ClientResult<PriorityUpdated> {
        let body = UpdatePriorityRequest {
            priority: Some(priority.as_str().to_string()),
        };
        let response = self
            .client
            .patch(self.endpoint(&format!("tasks/{id}/priority"))?)
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    async fn set_due_date(
        &self,
        id: &str,
        due_date: Option<DateTime<Utc>>,
    ) -> ClientResult<DueDateUpdated> {
        let body = UpdateDueDateRequest {
            due_date: due_date.map(|d| d.to_rfc3339()),
        };
        let response = self
            .client
            .patch(self.endpoint(&format!("tasks/{id}/dueDate"))?)
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    async fn delete_task(&self, id: &str) -> ClientResult<TaskDeleted> {
        let response = self
            .client
            .delete(self.endpoint(&format!("tasks/{id}"))?)
            .send()
            .await?;
        decode(response).await
    }
}
