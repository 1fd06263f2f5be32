use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateTaskRequest, UpdateTaskRequest},
    repo::{self, Task},
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    projects::{dto::MessageResponse, repo as project_repo},
    state::AppState,
    validation::{ResourceId, ValidatedJson},
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/projects/:id/tasks",
            get(list_tasks).post(create_task),
        )
        .route("/tasks/:id", patch(update_task).delete(delete_task))
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found or access denied.".into())
}

/// Read-only, so the owner check may run as its own query.
#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ResourceId(project_id): ResourceId,
) -> ApiResult<Json<Vec<Task>>> {
    if !project_repo::is_owned_by(&state.db, project_id, user_id).await? {
        return Err(ApiError::AccessDenied(
            "You do not have access to this project.".into(),
        ));
    }
    let tasks = repo::list_by_project(&state.db, project_id).await?;
    Ok(Json(tasks))
}

#[instrument(skip(state, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ResourceId(project_id): ResourceId,
    ValidatedJson(payload): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = repo::create_in_owned_project(&state.db, project_id, user_id, &payload.title)
        .await?
        .ok_or_else(|| {
            ApiError::AccessDenied("You cannot add tasks to a project you do not own.".into())
        })?;
    info!(task_id = task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// With no fields supplied the row is returned as stored, still owner-checked.
#[instrument(skip(state, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ResourceId(task_id): ResourceId,
    ValidatedJson(payload): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let changes = payload.into_changes();
    let task = if changes.is_empty() {
        repo::find_owned(&state.db, task_id, user_id).await?
    } else {
        repo::update_owned(&state.db, task_id, user_id, &changes).await?
    };
    let task = task.ok_or_else(task_not_found)?;
    info!(task_id, status = %task.status, "task updated");
    Ok(Json(task))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ResourceId(task_id): ResourceId,
) -> ApiResult<Json<MessageResponse>> {
    if !repo::delete_owned(&state.db, task_id, user_id).await? {
        return Err(task_not_found());
    }
    info!(task_id, "task deleted");
    Ok(Json(MessageResponse {
        message: "Task deleted successfully",
    }))
}
