use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateProjectRequest, MessageResponse},
    repo::{self, Project},
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
    validation::{ResourceId, ValidatedJson},
};

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id", delete(delete_project))
}

#[instrument(skip(state))]
pub async fn list_projects(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(projects))
}

#[instrument(skip(state, payload))]
pub async fn create_project(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = repo::create(&state.db, user_id, &payload.name).await?;
    info!(project_id = project.id, "project created");
    Ok((StatusCode::CREATED, Json(project)))
}

#[instrument(skip(state))]
pub async fn delete_project(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ResourceId(project_id): ResourceId,
) -> ApiResult<Json<MessageResponse>> {
    if !repo::delete_owned(&state.db, project_id, user_id).await? {
        return Err(ApiError::NotFound(
            "Project not found or you do not have permission to delete it.".into(),
        ));
    }
    info!(project_id, "project deleted");
    Ok(Json(MessageResponse {
        message: "Project deleted successfully",
    }))
}
