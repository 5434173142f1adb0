//! Client-side task state.
//!
//! `TaskStore` mirrors the server's task list and is the only place it is
//! mutated. Every action applies its local change right away and hands back
//! a [`Pending`] request. The caller sends it whenever it likes and passes the
//! reply to [`TaskStore::complete`]; a failed reply puts the touched task back
//! the way it was and keeps the error for display.

use chrono::{DateTime, Utc};
use taskdeck_shared::{validate_title, CreateTaskRequest, Priority, Task, TaskField, TaskId};

use crate::api::{ClientError, ClientResult, TaskApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub const ALL: [PriorityFilter; 5] = [
        PriorityFilter::All,
        PriorityFilter::Only(Priority::Critical),
        PriorityFilter::Only(Priority::High),
        PriorityFilter::Only(Priority::Medium),
        PriorityFilter::Only(Priority::Low),
    ];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(priority) => task.priority == priority,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriorityFilter::All => "All",
            PriorityFilter::Only(priority) => priority.label(),
        }
    }

    pub fn next(self) -> PriorityFilter {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

/// The network half of a store action.
#[derive(Debug, Clone)]
pub enum Request {
    List,
    Create(CreateTaskRequest),
    Update { id: TaskId, field: TaskField },
    Delete { id: TaskId },
}

#[derive(Debug)]
pub enum Reply {
    Tasks(Vec<Task>),
    Created(Task),
    Done,
}

impl Request {
    pub async fn send<A: TaskApi + ?Sized>(&self, api: &A) -> ClientResult<Reply> {
        match self {
            Request::List => api.list_tasks().await.map(Reply::Tasks),
            Request::Create(request) => api.create_task(request).await.map(Reply::Created),
            Request::Update { id, field } => {
                match field {
                    TaskField::Completed(completed) => {
                        api.set_completed(id, *completed).await.map(|_| ())
                    }
                    TaskField::Title(title) => api.rename(id, title).await.map(|_| ()),
                    TaskField::Priority(priority) => {
                        api.set_priority(id, *priority).await.map(|_| ())
                    }
                    TaskField::DueDate(due_date) => {
                        api.set_due_date(id, *due_date).await.map(|_| ())
                    }
                }?;
                Ok(Reply::Done)
            }
            Request::Delete { id } => api.delete_task(id).await.map(|_| Reply::Done),
        }
    }

    /// Shown when the server gives no message of its own.
    fn fallback(&self) -> &'static str {
        match self {
            Request::List => "Failed to load tasks",
            Request::Create(_) => "Failed to create task",
            Request::Update { field, .. } => match field {
                TaskField::Completed(_) => "Failed to update task",
                TaskField::Title(_) => "Failed to update title",
                TaskField::Priority(_) => "Failed to update priority",
                TaskField::DueDate(_) => "Failed to update due date",
            },
            Request::Delete { .. } => "Failed to delete task",
        }
    }
}

#[derive(Debug)]
enum Undo {
    Nothing,
    Restore(Task),
    Reinsert { index: usize, task: Task },
}

/// A request whose local effect is already visible.
#[derive(Debug)]
pub struct Pending {
    request: Request,
    undo: Undo,
}

impl Pending {
    pub async fn send<A: TaskApi + ?Sized>(&self, api: &A) -> ClientResult<Reply> {
        self.request.send(api).await
    }
}

pub struct TaskStore<A> {
    api: A,
    tasks: Vec<Task>,
    filter: PriorityFilter,
    error: Option<String>,
}

impl<A: TaskApi> TaskStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            filter: PriorityFilter::All,
            error: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn filter(&self) -> PriorityFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: PriorityFilter) {
        self.filter = filter;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn report(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Tasks passing the active filter, in list order. Never refetches.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| self.filter.matches(t)).collect()
    }

    /// `(shown, total)`
    pub fn counts(&self) -> (usize, usize) {
        (self.visible_tasks().len(), self.tasks().len())
    }

    pub fn load(&mut self) -> Pending {
        Pending {
            request: Request::List,
            undo: Undo::Nothing,
        }
    }

    /// Not optimistic since the id only exists once the server has answered.
    /// The stored copy is prepended by [`TaskStore::complete`].
    pub fn add_task(
        &mut self,
        title: &str,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
    ) -> Option<Pending> {
        self.error = None;
        let title = title.trim();
        if title.is_empty() {
            self.error = Some("Enter a title.".to_string());
            return None;
        }

        Some(Pending {
            request: Request::Create(CreateTaskRequest {
                title: Some(title.to_string()),
                priority: Some(priority.as_str().to_string()),
                due_date: due_date.map(|d| d.to_rfc3339()),
            }),
            undo: Undo::Nothing,
        })
    }

    pub fn toggle_completed(&mut self, id: &str) -> Option<Pending> {
        let completed = !self.task(id)?.completed;
        self.update(id, TaskField::Completed(completed))
    }

    pub fn rename(&mut self, id: &str, title: &str) -> Option<Pending> {
        match validate_title(Some(title)) {
            Ok(title) => self.update(id, TaskField::Title(title)),
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    pub fn set_priority(&mut self, id: &str, priority: Priority) -> Option<Pending> {
        self.update(id, TaskField::Priority(priority))
    }

    pub fn set_due_date(&mut self, id: &str, due_date: Option<DateTime<Utc>>) -> Option<Pending> {
        self.update(id, TaskField::DueDate(due_date))
    }

    pub fn delete(&mut self, id: &str) -> Option<Pending> {
        self.error = None;
        let index = self.tasks.iter().position(|t| t.id == id)?;
        let task = self.tasks.remove(index);
        Some(Pending {
            request: Request::Delete { id: task.id.clone() },
            undo: Undo::Reinsert { index, task },
        })
    }

    /// Settles a request with the server's reply. Returns whether it succeeded.
    pub fn complete(&mut self, pending: Pending, result: ClientResult<Reply>) -> bool {
        let Pending { request, undo } = pending;
        match result {
            Ok(Reply::Tasks(tasks)) => {
                log::info!("loaded {} tasks", tasks.len());
                self.tasks = tasks;
                self.error = None;
                true
            }
            Ok(Reply::Created(task)) => {
                self.tasks.insert(0, task);
                true
            }
            Ok(Reply::Done) => true,
            Err(err) => {
                self.undo(undo);
                self.fail(request.fallback(), err);
                false
            }
        }
    }

    /// Sends `pending` and waits for the reply.
    pub async fn run(&mut self, pending: impl Into<Option<Pending>>) -> bool {
        let Some(pending) = pending.into() else {
            return false;
        };
        let result = pending.send(&self.api).await;
        self.complete(pending, result)
    }

    fn update(&mut self, id: &str, field: TaskField) -> Option<Pending> {
        self.error = None;
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        let previous = task.clone();
        task.apply(&field);
        Some(Pending {
            request: Request::Update {
                id: previous.id.clone(),
                field,
            },
            undo: Undo::Restore(previous),
        })
    }

    /// Only the touched task is reverted, so replies to other requests still
    /// in flight are not lost.
    fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::Nothing => {}
            Undo::Restore(previous) => {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == previous.id) {
                    *task = previous;
                }
            }
            Undo::Reinsert { index, task } => {
                let index = index.min(self.tasks.len());
                self.tasks.insert(index, task);
            }
        }
    }

    fn fail(&mut self, fallback: &str, err: ClientError) {
        let message = match err {
            ClientError::Server { status, message } => {
                log::error!("{fallback}: server answered {status}: {message}");
                message
            }
            other => {
                log::error!("{fallback}: {other}");
                fallback.to_string()
            }
        };
        self.error = Some(if message.is_empty() {
            fallback.to_string()
        } else {
            message
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use taskdeck_shared::{
        CompletedUpdated, DueDateUpdated, PriorityUpdated, TaskDeleted, TitleUpdated,
    };

    #[derive(Default)]
    pub(crate) struct MockState {
        pub tasks: Vec<Task>,
        pub fail_with: Option<String>,
        pub calls: Vec<String>,
    }

    /// Records calls and answers like the server would, or fails every call
    /// with `fail_with` when it is set.
    #[derive(Clone, Default)]
    pub(crate) struct MockApi {
        pub state: Arc<Mutex<MockState>>,
    }

    impl MockApi {
        pub fn with_tasks(tasks: Vec<Task>) -> Self {
            let api = Self::default();
            api.state.lock().tasks = tasks;
            api
        }

        pub fn fail_with(&self, message: &str) {
            self.state.lock().fail_with = Some(message.to_string());
        }

        pub fn calls(&self) -> Vec<String> {
            self.state.lock().calls.clone()
        }

        fn call(&self, name: String) -> ClientResult<()> {
            let mut state = self.state.lock();
            state.calls.push(name);
            match &state.fail_with {
                Some(message) => Err(ClientError::Server {
                    status: 500,
                    message: message.clone(),
                }),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl TaskApi for MockApi {
        async fn list_tasks(&self) -> ClientResult<Vec<Task>> {
            self.call("list".to_string())?;
            Ok(self.state.lock().tasks.clone())
        }

        async fn create_task(&self, request: &CreateTaskRequest) -> ClientResult<Task> {
            self.call("create".to_string())?;
            let mut state = self.state.lock();
            let task = Task {
                id: format!("new-{}", state.tasks.len()),
                title: request.title.clone().unwrap_or_default(),
                priority: request
                    .priority
                    .as_deref()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or_default(),
                due_date: None,
                completed: false,
                created_at: Utc::now(),
            };
            state.tasks.insert(0, task.clone());
            Ok(task)
        }

        async fn set_completed(
            &self,
            id: &str,
            completed: bool,
        ) -> ClientResult<CompletedUpdated> {
            self.call(format!("completed {id} {completed}"))?;
            Ok(CompletedUpdated {
                id: id.to_string(),
                completed,
            })
        }

        async fn rename(&self, id: &str, title: &str) -> ClientResult<TitleUpdated> {
            self.call(format!("title {id} {title}"))?;
            Ok(TitleUpdated {
                id: id.to_string(),
                title: title.to_string(),
            })
        }

        async fn set_priority(
            &self,
            id: &str,
            priority: Priority,
        ) -> ClientResult<PriorityUpdated> {
            self.call(format!("priority {id} {priority}"))?;
            Ok(PriorityUpdated {
                id: id.to_string(),
                priority,
            })
        }

        async fn set_due_date(
            &self,
            id: &str,
            due_date: Option<DateTime<Utc>>,
        ) -> ClientResult<DueDateUpdated> {
            self.call(format!("dueDate {id}"))?;
            Ok(DueDateUpdated {
                id: id.to_string(),
                due_date,
            })
        }

        async fn delete_task(&self, id: &str) -> ClientResult<TaskDeleted> {
            self.call(format!("delete {id}"))?;
            Ok(TaskDeleted { id: id.to_string() })
        }
    }

    pub(crate) fn task(id: &str, priority: Priority) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            priority,
            due_date: None,
            completed: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    /// Starts a store action and waits for it to settle.
    macro_rules! run {
        ($store:ident . $action:ident ( $($arg:expr),* )) => {{
            let pending = $store.$action($($arg),*);
            $store.run(pending).await
        }};
    }

    async fn loaded_store(api: &MockApi) -> TaskStore<MockApi> {
        let mut store = TaskStore::new(api.clone());
        assert!(run!(store.load()));
        store
    }

    fn sample() -> MockApi {
        MockApi::with_tasks(vec![
            task("a", Priority::High),
            task("b", Priority::Low),
            task("c", Priority::High),
        ])
    }

    fn ids(store: &TaskStore<MockApi>) -> Vec<&str> {
        store.tasks().iter().map(|t| t.id.as_str()).collect()
    }

    #[tokio::test]
    async fn filter_is_a_projection() {
        let api = sample();
        let mut store = loaded_store(&api).await;

        store.set_filter(PriorityFilter::Only(Priority::High));
        let ids: Vec<&str> = store.visible_tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(store.counts(), (2, 3));

        store.set_filter(PriorityFilter::Only(Priority::Critical));
        assert!(store.visible_tasks().is_empty());
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn load_failure_is_reported() {
        let api = sample();
        api.fail_with("Failed to fetch tasks");
        let mut store = TaskStore::new(api);

        assert!(!run!(store.load()));
        assert_eq!(store.error(), Some("Failed to fetch tasks"));
        assert!(store.tasks().is_empty());
    }

    #[tokio::test]
    async fn add_prepends_server_copy() {
        let api = sample();
        let mut store = loaded_store(&api).await;

        let pending = store.add_task("  Write report ", Priority::Critical, None);
        assert_eq!(store.tasks().len(), 3);
        assert!(store.run(pending).await);

        assert_eq!(store.tasks()[0].title, "Write report");
        assert_eq!(store.tasks()[0].priority, Priority::Critical);
        assert_eq!(store.tasks().len(), 4);
    }

    #[tokio::test]
    async fn add_with_blank_title_never_calls_the_server() {
        let api = sample();
        let mut store = loaded_store(&api).await;

        assert!(store.add_task("   ", Priority::Medium, None).is_none());
        assert_eq!(store.error(), Some("Enter a title."));
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn successful_mutations_stick() {
        let api = sample();
        let mut store = loaded_store(&api).await;
        let due = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap();

        assert!(run!(store.toggle_completed("a")));
        assert!(run!(store.rename("a", " renamed ")));
        assert!(run!(store.set_priority("a", Priority::Low)));
        assert!(run!(store.set_due_date("a", Some(due))));

        let a = store.task("a").unwrap();
        assert!(a.completed);
        assert_eq!(a.title, "renamed");
        assert_eq!(a.priority, Priority::Low);
        assert_eq!(a.due_date, Some(due));
        assert_eq!(
            api.calls(),
            vec![
                "list",
                "completed a true",
                "title a renamed",
                "priority a low",
                "dueDate a"
            ]
        );
    }

    #[tokio::test]
    async fn local_change_is_visible_before_the_reply() {
        let api = sample();
        let mut store = loaded_store(&api).await;

        let pending = store.set_priority("b", Priority::Critical).unwrap();
        assert_eq!(store.task("b").unwrap().priority, Priority::Critical);
        assert_eq!(api.calls(), vec!["list"]);

        let result = pending.send(store.api()).await;
        assert!(store.complete(pending, result));
        assert_eq!(store.task("b").unwrap().priority, Priority::Critical);
    }

    #[tokio::test]
    async fn failed_mutation_is_rolled_back() {
        let api = sample();
        let mut store = loaded_store(&api).await;
        let before = store.tasks().to_vec();
        api.fail_with("Failed to update priority");

        assert!(!run!(store.set_priority("b", Priority::Critical)));
        assert_eq!(store.tasks(), before.as_slice());
        assert_eq!(store.error(), Some("Failed to update priority"));

        assert!(!run!(store.toggle_completed("b")));
        assert!(!store.task("b").unwrap().completed);
    }

    #[tokio::test]
    async fn rollback_keeps_other_requests_in_flight() {
        let api = sample();
        let mut store = loaded_store(&api).await;

        let first = store.set_priority("a", Priority::Low).unwrap();
        let second = store.toggle_completed("c").unwrap();

        api.fail_with("Failed to update priority");
        let failed = first.send(store.api()).await;
        assert!(!store.complete(first, failed));
        assert_eq!(store.task("a").unwrap().priority, Priority::High);
        assert!(store.task("c").unwrap().completed);

        api.state.lock().fail_with = None;
        let ok = second.send(store.api()).await;
        assert!(store.complete(second, ok));
        assert!(store.task("c").unwrap().completed);
    }

    #[tokio::test]
    async fn failed_delete_restores_the_task_in_place() {
        let api = sample();
        let mut store = loaded_store(&api).await;
        api.fail_with("Failed to delete task");

        let pending = store.delete("b");
        assert_eq!(ids(&store), vec!["a", "c"]);
        assert!(!store.run(pending).await);
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert_eq!(store.error(), Some("Failed to delete task"));
    }

    #[tokio::test]
    async fn delete_removes_locally() {
        let api = sample();
        let mut store = loaded_store(&api).await;

        assert!(run!(store.delete("b")));
        assert!(store.task("b").is_none());
        assert_eq!(api.calls().last().map(String::as_str), Some("delete b"));
    }

    #[tokio::test]
    async fn actions_on_unknown_ids_do_nothing() {
        let api = sample();
        let mut store = loaded_store(&api).await;

        assert!(store.toggle_completed("zz").is_none());
        assert!(store.set_priority("zz", Priority::Low).is_none());
        assert!(store.delete("zz").is_none());
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn transport_errors_use_the_action_message() {
        let api = sample();
        let mut store = loaded_store(&api).await;

        let pending = store.rename("a", "new").unwrap();
        let error = ClientError::Url(url::ParseError::EmptyHost);
        assert!(!store.complete(pending, Err(error)));
        assert_eq!(store.error(), Some("Failed to update title"));
        assert_eq!(store.task("a").unwrap().title, "task a");
    }

    #[tokio::test]
    async fn invalid_rename_is_refused_locally() {
        let api = sample();
        let mut store = loaded_store(&api).await;

        assert!(store.rename("a", "   ").is_none());
        assert_eq!(store.error(), Some("Title is required"));
        assert_eq!(store.task("a").unwrap().title, "task a");
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[test]
    fn filter_cycles_through_every_priority() {
        let mut filter = PriorityFilter::All;
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(filter.label());
            filter = filter.next();
        }
        assert_eq!(seen, vec!["All", "Critical", "High", "Medium", "Low"]);
        assert_eq!(filter, PriorityFilter::All);
    }
}
