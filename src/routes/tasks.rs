//! Task handlers. Every operation runs owner-scoped: the caller's id from
//! `AuthedUser` is the only owner these handlers ever pass to the store, so a
//! task belonging to someone else is indistinguishable from one that does not
//! exist.

use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::error::AppError;
use crate::models::task::validate_description;
use crate::models::{Task, TaskCreate, TaskListQuery, TaskPatch};
use crate::state::AppState;

/// Create a task owned by the caller.
///
/// Any `owner` value in the body is ignored; the owner is always the
/// authenticated user.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    caller: AuthedUser,
    input: web::Json<TaskCreate>,
) -> Result<impl Responder, AppError> {
    let (description, completed) = input.into_inner().validated()?;
    let task = Task::new(description, completed, caller.user.id);
    state.tasks.insert(&task).await?;
    Ok(HttpResponse::Created().json(task))
}

/// List the caller's tasks.
///
/// ## Query parameters
/// - `completed` (optional): keep only matching tasks.
/// - `sortBy` (optional): `field:dir`, field one of `description`,
///   `completed`, `createdAt`, `updatedAt`; `desc` for descending.
/// - `limit` / `skip` (optional, independent): pagination.
///
/// Without parameters, all of the owner's tasks in store order.
#[get("")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    caller: AuthedUser,
    query: web::Query<TaskListQuery>,
) -> Result<impl Responder, AppError> {
    let filter = query.filter()?;
    let tasks = state.tasks.list_for_owner(caller.user.id, &filter).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Fetch one of the caller's tasks by id.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    caller: AuthedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .find_for_owner(caller.user.id, task_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("task not found".into()))?;
    Ok(HttpResponse::Ok().json(task))
}

/// Patch one of the caller's tasks. The allow-list is {description,
/// completed}; anything else fails deserialization with a 400.
#[patch("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    caller: AuthedUser,
    task_id: web::Path<Uuid>,
    patch: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    let patch = patch.into_inner();

    let mut task = state
        .tasks
        .find_for_owner(caller.user.id, task_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("task not found".into()))?;

    if patch.is_empty() {
        return Ok(HttpResponse::Ok().json(task));
    }

    if let Some(description) = &patch.description {
        task.description = validate_description(description).map_err(AppError::Validation)?;
    }
    if let Some(completed) = patch.completed {
        task.completed = completed;
    }

    task.updated_at = Utc::now();
    state.tasks.update(&task).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Delete one of the caller's tasks.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    caller: AuthedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let deleted = state
        .tasks
        .delete_for_owner(caller.user.id, task_id.into_inner())
        .await?;

    if !deleted {
        return Err(AppError::NotFound("task not found".into()));
    }
    Ok(HttpResponse::Ok().finish())
}
