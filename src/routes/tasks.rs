use crate::{
    auth::AuthenticatedUser,
    dashboard,
    error::AppError,
    models::{ApiResponse, TaskInput, TaskQuery},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;

/// Retrieves the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `priority` (optional): exact match, 1 to 5.
/// - `status` (optional): `pending` or `finished`.
/// - `sortBy` (optional): `title`, `startTime`, `endTime`, `priority`, `status`,
///   `estimatedTime` or `createdAt`. Without it tasks come back in creation order.
/// - `order` (optional): `asc` (default) or `desc`.
///
/// ## Responses:
/// - `200 OK`: `{success, message, data: [Task]}`; `data` may be empty.
/// - `400 Bad Request`: unparseable query parameters.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    query_params: web::Query<TaskQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(user.id(), &query_params).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        format!("Found {} task(s).", tasks.len()),
        tasks,
    )))
}

/// Creates a new task for the authenticated user.
///
/// `title`, `startTime`, `priority` and `status` are mandatory; `endTime` and
/// `estimatedTime` are optional. The owner is always the caller.
///
/// ## Responses:
/// - `201 Created`: `{success, message, data: Task}`.
/// - `400 Bad Request`: a mandatory field is missing or a value is out of range.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let new_task = task_data.into_inner().into_new_task()?;
    let task = state.tasks.create(user.id(), new_task).await?;
    log::debug!("user {} created task {}", user.id(), task.id);

    Ok(HttpResponse::Created().json(ApiResponse::ok("Task created successfully.", task)))
}

/// Updates fields of a task the caller owns.
///
/// ## Responses:
/// - `200 OK`: `{success, message, data: Task}`.
/// - `400 Bad Request`: no fields given, or a changed field is invalid.
/// - `404 Not Found`: no task with this id belongs to the caller.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let changes = task_data.into_inner();
    if changes.is_empty() {
        return Err(AppError::ValidationFailed(
            "Provide at least one field to update.".into(),
        ));
    }
    changes.validate_changes()?;

    let task = state
        .tasks
        .update(user.id(), task_id.into_inner(), changes)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok("Task updated successfully.", task)))
}

/// Deletes a task the caller owns.
///
/// ## Responses:
/// - `200 OK`: `{success, message}`.
/// - `404 Not Found`: no task with this id belongs to the caller.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    state.tasks.delete(user.id(), task_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Task deleted successfully.")))
}

/// Productivity statistics over all of the caller's tasks.
///
/// Unlike the other endpoints the statistics object is the whole body, without an
/// envelope. Minute and percentage values are rounded to two decimals.
#[get("/dashboard-stats")]
pub async fn dashboard_stats(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(user.id(), &TaskQuery::default()).await?;
    let stats = dashboard::aggregate_tasks(&tasks).rounded();

    Ok(HttpResponse::Ok().json(stats))
}
