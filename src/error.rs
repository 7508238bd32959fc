use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, TokenError};
use crate::routes::tasks::service::TaskError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure a handler can return. The variant decides both the status
/// code and the machine-readable `error` string.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("password is too short")]
    WeakPassword,

    #[error("user already exists")]
    DuplicateUser,

    #[error("invalid user")]
    InvalidUser,

    #[error("invalid password")]
    InvalidPassword,

    #[error("no authorization header")]
    MissingAuth,

    #[error("no token provided")]
    MissingToken,

    #[error("invalid or expired token")]
    Unauthorized,

    #[error("task not found or unauthorized")]
    NotFoundOrForbidden,

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::WeakPassword
            | ApiError::DuplicateUser
            | ApiError::InvalidUser
            | ApiError::InvalidPassword => StatusCode::BAD_REQUEST,
            ApiError::MissingAuth | ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::NotFoundOrForbidden => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "ValidationError",
            ApiError::WeakPassword => "WeakPassword",
            ApiError::DuplicateUser => "DuplicateUser",
            ApiError::InvalidUser => "InvalidUser",
            ApiError::InvalidPassword => "InvalidPassword",
            ApiError::MissingAuth => "MissingAuth",
            ApiError::MissingToken => "MissingToken",
            ApiError::Unauthorized => "Unauthorized",
            ApiError::NotFoundOrForbidden => "NotFoundOrForbidden",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: self.code().to_string(),
            message,
        });

        (self.status(), body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => ApiError::Validation(msg),
            AuthError::WeakPassword => ApiError::WeakPassword,
            AuthError::DuplicateUser => ApiError::DuplicateUser,
            AuthError::InvalidUser => ApiError::InvalidUser,
            AuthError::InvalidPassword => ApiError::InvalidPassword,
            AuthError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::Expired => ApiError::Unauthorized,
            TokenError::Sign(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(msg) => ApiError::Validation(msg),
            TaskError::NotFoundOrForbidden => ApiError::NotFoundOrForbidden,
            TaskError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
