use crate::{
    error::AppError,
    models::{CreateTaskInput, NewTask, TaskChanges, UpdateTaskInput},
    state::AppState,
    store::StoreError,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::info;
use uuid::Uuid;
use validator::Validate;

const TASK_NOT_FOUND: &str = "Task not found";
const USER_NOT_FOUND: &str = "User not found";

/// Task ids are not validated up front: a value that is not a UUID cannot name a row,
/// so it is reported exactly like a missing task.
fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(TASK_NOT_FOUND.into()))
}

/// Retrieves every task with its owner's `id`, `email` and `name`.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks, each with a `user` object.
/// - `500 Internal Server Error`: For database errors.
#[get("")]
pub async fn get_tasks(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let tasks = state
        .store
        .list_tasks()
        .await
        .map_err(|e| AppError::internal("Error fetching tasks", e))?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: The task with its owner summary.
/// - `404 Not Found`: If the task does not exist.
/// - `500 Internal Server Error`: For database errors.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&task_id)?;

    let task = state
        .store
        .find_task(id)
        .await
        .map_err(|e| AppError::internal("Error fetching task", e))?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound(TASK_NOT_FOUND.into())),
    }
}

/// Retrieves every task owned by a user.
///
/// An unknown user is not an error: the response is simply an empty array.
#[get("/user/{user_id}")]
pub async fn get_tasks_by_user(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let Ok(user_id) = Uuid::parse_str(&user_id) else {
        return Ok(HttpResponse::Ok().json(Vec::<()>::new()));
    };

    let tasks = state
        .store
        .tasks_for_user(user_id)
        .await
        .map_err(|e| AppError::internal("Error fetching tasks", e))?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for an existing user.
///
/// ## Request Body:
/// - `title`: Non-empty title.
/// - `description` (optional): Free text.
/// - `completed` (optional): Defaults to `false`.
/// - `userId`: Id of the owning user.
///
/// ## Responses:
/// - `201 Created`: The created task with its owner summary.
/// - `400 Bad Request`: If validation fails.
/// - `404 Not Found`: If `userId` does not name an existing user. No task is created.
/// - `500 Internal Server Error`: For database errors.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    task_data: web::Json<CreateTaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let CreateTaskInput {
        title,
        description,
        completed,
        user_id,
    } = task_data.into_inner();
    let (Some(title), Some(user_id)) = (title, user_id) else {
        return Err(AppError::BadRequest("Title and user ID are required".into()));
    };

    let user_id =
        Uuid::parse_str(&user_id).map_err(|_| AppError::NotFound(USER_NOT_FOUND.into()))?;

    let user_exists = state
        .store
        .user_exists(user_id)
        .await
        .map_err(|e| AppError::internal("Error creating task", e))?;

    if !user_exists {
        return Err(AppError::NotFound(USER_NOT_FOUND.into()));
    }

    // The owner may be deleted between the check and the insert; the foreign key catches that.
    let task = state
        .store
        .create_task(NewTask::new(title, description, completed, user_id))
        .await
        .map_err(|e| match e {
            StoreError::ForeignKeyViolation(_) => AppError::NotFound(USER_NOT_FOUND.into()),
            e => AppError::internal("Error creating task", e),
        })?;

    info!("Created task {} for user {}", task.task.id, user_id);
    Ok(HttpResponse::Created().json(task))
}

/// Applies a partial update to a task.
///
/// Fields missing from the body are left unchanged; the owner cannot be changed.
///
/// ## Responses:
/// - `200 OK`: The updated task with its owner summary.
/// - `400 Bad Request`: If validation fails.
/// - `404 Not Found`: If the task does not exist.
/// - `500 Internal Server Error`: For database errors.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    task_id: web::Path<String>,
    task_data: web::Json<UpdateTaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let id = parse_task_id(&task_id)?;

    let task = state
        .store
        .update_task(id, TaskChanges::from(task_data.into_inner()))
        .await
        .map_err(|e| match e {
            StoreError::NotFound => AppError::NotFound(TASK_NOT_FOUND.into()),
            e => AppError::internal("Error updating task", e),
        })?;

    info!("Updated task {}", id);
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `404 Not Found`: If the task does not exist.
/// - `500 Internal Server Error`: For database errors.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&task_id)?;

    state.store.delete_task(id).await.map_err(|e| match e {
        StoreError::NotFound => AppError::NotFound(TASK_NOT_FOUND.into()),
        e => AppError::internal("Error deleting task", e),
    })?;

    info!("Deleted task {}", id);
    Ok(HttpResponse::NoContent().finish())
}
