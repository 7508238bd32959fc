use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::routes::extract::AppJson;
use crate::routes::middleware_auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SigninRequest {
    pub name: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SigninResponse {
    pub token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .credentials
        .create_user(&payload.name, &payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully",
        }),
    ))
}

pub async fn signin(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SigninRequest>,
) -> ApiResult<Json<SigninResponse>> {
    let user_id = state
        .credentials
        .authenticate(&payload.name, &payload.password)
        .await?;

    let token = state.tokens.issue(user_id)?;
    tracing::info!(user_id = %user_id, "signed in");

    Ok(Json(SigninResponse { token }))
}

/// A token can outlive its account; such callers are treated as unauthorized.
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .credentials
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(user))
}

pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    if !state.credentials.delete_user(user_id).await? {
        return Err(ApiError::Unauthorized);
    }

    tracing::info!(user_id = %user_id, "account deleted");
    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}
