use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;

use super::dto::{CreateTask, ListQuery, UpdateTask};
use super::model::{Task, TaskPage};
use crate::error::ApiResult;
use crate::routes::auth::MessageResponse;
use crate::routes::extract::{AppJson, AppPath, AppQuery};
use crate::routes::middleware_auth::AuthUser;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppQuery(query): AppQuery<ListQuery>,
) -> ApiResult<Json<TaskPage>> {
    let filter = query.status_filter()?;
    let page = state.tasks.list(user_id, query.pagination(), filter).await?;
    Ok(Json(page))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(body): AppJson<CreateTask>,
) -> ApiResult<impl IntoResponse> {
    let task = state.tasks.create(user_id, body.validate()?).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.get(user_id, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateTask>,
) -> ApiResult<Json<MessageResponse>> {
    // required fields are checked before ownership
    let changes = body.validate()?;
    state.tasks.update(user_id, id, changes).await?;

    Ok(Json(MessageResponse {
        message: "Task updated successfully",
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.tasks.delete(user_id, id).await?;

    Ok(Json(MessageResponse {
        message: "Task deleted successfully",
    }))
}
