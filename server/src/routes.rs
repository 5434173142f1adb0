use actix_web::{delete, error, get, patch, post, web, HttpRequest, HttpResponse, Responder};
use taskdeck_shared::{
    CreateTaskRequest, UpdateCompletedRequest, UpdateDueDateRequest, UpdatePriorityRequest,
    UpdateTitleRequest,
};

use crate::error::ApiError;
use crate::service::{ApiResult, TaskService};

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body("api todo app is running")
}

/// Liveness only: never touches the task store.
#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

#[get("/tasks")]
async fn list_tasks(service: web::Data<TaskService>) -> ApiResult<HttpResponse> {
    let tasks = service.list().await?;
    Ok(HttpResponse::Ok().json(tasks))
}

#[post("/tasks")]
async fn create_task(
    service: web::Data<TaskService>,
    body: web::Json<CreateTaskRequest>,
) -> ApiResult<HttpResponse> {
    let task = service.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

#[patch("/tasks/{id}")]
async fn update_completed(
    service: web::Data<TaskService>,
    id: web::Path<String>,
    body: web::Json<UpdateCompletedRequest>,
) -> ApiResult<HttpResponse> {
    let updated = service.set_completed(&id, &body.completed).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[patch("/tasks/{id}/title")]
async fn update_title(
    service: web::Data<TaskService>,
    id: web::Path<String>,
    body: web::Json<UpdateTitleRequest>,
) -> ApiResult<HttpResponse> {
    let updated = service.rename(&id, body.title.as_deref()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[patch("/tasks/{id}/priority")]
async fn update_priority(
    service: web::Data<TaskService>,
    id: web::Path<String>,
    body: web::Json<UpdatePriorityRequest>,
) -> ApiResult<HttpResponse> {
    let updated = service.reprioritize(&id, body.priority.as_deref()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[patch("/tasks/{id}/dueDate")]
async fn update_due_date(
    service: web::Data<TaskService>,
    id: web::Path<String>,
    body: web::Json<UpdateDueDateRequest>,
) -> ApiResult<HttpResponse> {
    let updated = service.reschedule(&id, body.due_date.as_deref()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/tasks/{id}")]
async fn delete_task(
    service: web::Data<TaskService>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let deleted = service.delete(&id).await?;
    Ok(HttpResponse::Ok().json(deleted))
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    log::debug!("rejected request body: {err}");
    ApiError::BadRequest(format!("Invalid JSON body: {err}")).into()
}

/// Registers every route plus the JSON body error handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(index)
        .service(health)
        .service(list_tasks)
        .service(create_task)
        .service(update_completed)
        .service(update_title)
        .service(update_priority)
        .service(update_due_date)
        .service(delete_task);
}
