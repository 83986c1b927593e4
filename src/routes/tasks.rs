use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{TaskInput, TaskQuery},
    tasks::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;

/// Retrieves the authenticated user's tasks, newest first.
///
/// ## Query Parameters:
/// - `status` (optional): e.g. `todo`, `in_progress`, `done`.
/// - `priority` (optional): e.g. `low`, `high`.
/// - `search` (optional): case-insensitive match on title and description.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let list = tasks.list(user.id, &query).await;
    Ok(HttpResponse::Ok().json(list))
}

/// Creates a task owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `400 Bad Request`: malformed body or failed validation.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = tasks.create(user.id, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = tasks.get(user.id, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Replaces the editable fields of a task the user owns.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `404 Not Found`: no such task, or owned by another user.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .update(user.id, task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task the user owns. Responds `204 No Content`.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    tasks.delete(user.id, task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
