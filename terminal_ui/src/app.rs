use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskdeck_shared::{parse_due_date, Priority, Task, TaskId, MAX_TITLE_LEN};

use crate::api::{ClientResult, TaskApi};
use crate::store::{Pending, Reply, TaskStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    DueDate,
}

/// The "new task" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub priority: Priority,
    pub due_date: String,
    pub field: DraftField,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            priority: Priority::Medium,
            due_date: String::new(),
            field: DraftField::Title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Adding(TaskDraft),
    EditingTitle { id: TaskId, buffer: String },
    EditingDueDate { id: TaskId, buffer: String },
    ConfirmDelete { id: TaskId },
}

pub struct App<A> {
    store: TaskStore<A>,
    selected: usize,
    mode: Mode,
    should_quit: bool,
}

/// What a key press leads to: the next mode and maybe a request to send.
type Step = (Mode, Option<Pending>);

const COMPLETED_LOCKED: &str = "You can't edit completed tasks";

impl<A: TaskApi> App<A> {
    pub fn new(store: TaskStore<A>) -> Self {
        Self {
            store,
            selected: 0,
            mode: Mode::Normal,
            should_quit: false,
        }
    }

    pub fn store(&self) -> &TaskStore<A> {
        &self.store
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.store
            .visible_tasks()
            .get(self.selected)
            .map(|t| t.id.clone())
    }

    /// Fetches the list and waits for it. Used once before the UI starts.
    pub async fn load(&mut self) {
        let pending = self.store.load();
        self.store.run(pending).await;
        self.clamp_selection();
    }

    /// Settles a request handed out by [`App::on_key`].
    pub fn complete(&mut self, pending: Pending, result: ClientResult<Reply>) {
        self.store.complete(pending, result);
        self.clamp_selection();
    }

    /// Applies the key to local state. Any request it returns has already
    /// taken effect locally and still has to be sent.
    pub fn on_key(&mut self, key: KeyEvent) -> Option<Pending> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        let mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let (mode, pending) = match mode {
            Mode::Normal => self.on_normal_key(key),
            Mode::Adding(draft) => self.on_adding_key(draft, key),
            Mode::EditingTitle { id, buffer } => self.on_edit_title_key(id, buffer, key),
            Mode::EditingDueDate { id, buffer } => self.on_edit_due_key(id, buffer, key),
            Mode::ConfirmDelete { id } => self.on_confirm_key(id, key),
        };
        self.mode = mode;
        self.clamp_selection();
        pending
    }

    fn on_normal_key(&mut self, key: KeyEvent) -> Step {
        let pending = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
                None
            }
            KeyCode::Tab | KeyCode::Char('f') => {
                let next = self.store.filter().next();
                self.store.set_filter(next);
                self.selected = 0;
                None
            }
            KeyCode::Char('r') => Some(self.store.load()),
            KeyCode::Char('a') => {
                self.store.clear_error();
                return (Mode::Adding(TaskDraft::default()), None);
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let id = self.selected_id();
                id.and_then(|id| self.store.toggle_completed(&id))
            }
            KeyCode::Char('p') => self
                .selected_priority()
                .and_then(|(id, priority)| self.store.set_priority(&id, priority.next())),
            KeyCode::Char('e') => {
                if let Some(task) = self.editable_task() {
                    let mode = Mode::EditingTitle {
                        id: task.id,
                        buffer: task.title,
                    };
                    self.store.clear_error();
                    return (mode, None);
                }
                None
            }
            KeyCode::Char('d') => {
                if let Some(task) = self.editable_task() {
                    let mode = Mode::EditingDueDate {
                        id: task.id,
                        buffer: task
                            .due_date
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_default(),
                    };
                    self.store.clear_error();
                    return (mode, None);
                }
                None
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                let id = self.selected_id();
                match id {
                    Some(id) if self.store.task(&id).is_some_and(|t| t.completed) => {
                        self.store.delete(&id)
                    }
                    Some(id) => return (Mode::ConfirmDelete { id }, None),
                    None => None,
                }
            }
            _ => None,
        };
        (Mode::Normal, pending)
    }

    fn on_adding_key(&mut self, mut draft: TaskDraft, key: KeyEvent) -> Step {
        match key.code {
            KeyCode::Esc => return (Mode::Normal, None),
            KeyCode::Tab => {
                draft.field = match draft.field {
                    DraftField::Title => DraftField::DueDate,
                    DraftField::DueDate => DraftField::Title,
                };
            }
            KeyCode::Up => draft.priority = previous_priority(draft.priority),
            KeyCode::Down => draft.priority = draft.priority.next(),
            KeyCode::Backspace => {
                active_buffer(&mut draft).pop();
            }
            KeyCode::Char(c) => {
                let title_full = draft.field == DraftField::Title
                    && draft.title.chars().count() >= MAX_TITLE_LEN;
                if !title_full {
                    active_buffer(&mut draft).push(c);
                }
            }
            KeyCode::Enter => {
                let due_date = match parse_due_date(Some(&draft.due_date)) {
                    Ok(due_date) => due_date,
                    Err(err) => {
                        self.store.report(err.to_string());
                        return (Mode::Adding(draft), None);
                    }
                };
                if let Some(pending) = self.store.add_task(&draft.title, draft.priority, due_date)
                {
                    self.selected = 0;
                    return (Mode::Normal, Some(pending));
                }
            }
            _ => {}
        }
        (Mode::Adding(draft), None)
    }

    fn on_edit_title_key(&mut self, id: TaskId, mut buffer: String, key: KeyEvent) -> Step {
        match key.code {
            KeyCode::Esc => return (Mode::Normal, None),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if buffer.chars().count() < MAX_TITLE_LEN => buffer.push(c),
            KeyCode::Enter => {
                let pending = self.store.rename(&id, &buffer);
                if pending.is_some() || self.store.error().is_none() {
                    return (Mode::Normal, pending);
                }
            }
            _ => {}
        }
        (Mode::EditingTitle { id, buffer }, None)
    }

    fn on_edit_due_key(&mut self, id: TaskId, mut buffer: String, key: KeyEvent) -> Step {
        match key.code {
            KeyCode::Esc => return (Mode::Normal, None),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Enter => match parse_due_date(Some(&buffer)) {
                Ok(due_date) => return (Mode::Normal, self.store.set_due_date(&id, due_date)),
                Err(err) => self.store.report(err.to_string()),
            },
            _ => {}
        }
        (Mode::EditingDueDate { id, buffer }, None)
    }

    fn on_confirm_key(&mut self, id: TaskId, key: KeyEvent) -> Step {
        let pending = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => self.store.delete(&id),
            _ => None,
        };
        (Mode::Normal, pending)
    }

    /// The selected task, unless it is completed. Completed tasks are locked
    /// against title and due date edits.
    fn editable_task(&mut self) -> Option<Task> {
        let id = self.selected_id()?;
        let task = self.store.task(&id)?.clone();
        if task.completed {
            self.store.report(COMPLETED_LOCKED);
            return None;
        }
        Some(task)
    }

    fn selected_priority(&self) -> Option<(TaskId, Priority)> {
        let id = self.selected_id()?;
        self.store.task(&id).map(|t| (t.id.clone(), t.priority))
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.store.visible_tasks().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    fn clamp_selection(&mut self) {
        let len = self.store.visible_tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

fn active_buffer(draft: &mut TaskDraft) -> &mut String {
    match draft.field {
        DraftField::Title => &mut draft.title,
        DraftField::DueDate => &mut draft.due_date,
    }
}

fn previous_priority(priority: Priority) -> Priority {
    let index = Priority::ALL.iter().position(|p| *p == priority).unwrap_or(0);
    Priority::ALL[(index + Priority::ALL.len() - 1) % Priority::ALL.len()]
}
