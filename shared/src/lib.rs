mod requests;
mod task;
mod validation;

pub use requests::{
    CompletedUpdated, CreateTaskRequest, DueDateUpdated, ErrorResponse, PriorityUpdated,
    TaskDeleted, TitleUpdated, UpdateCompletedRequest, UpdateDueDateRequest,
    UpdatePriorityRequest, UpdateTitleRequest,
};
pub use task::{Priority, Task, TaskField, TaskId};
pub use validation::{
    parse_due_date, validate_completed, validate_priority, validate_required_priority,
    validate_title, ValidationError, MAX_TITLE_LEN,
};
