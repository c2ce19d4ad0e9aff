use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lingua::LinguaError;
use lingua::dialogue::DialogueError;
use lingua::profile::ProfileError;
use lingua_core::CoreError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Error body returned by every endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LinguaError> for ApiError {
    fn from(err: LinguaError) -> Self {
        let message = err.to_string();
        match err {
            e if e.is_not_found() => ApiError::NotFound(message),
            LinguaError::Core(CoreError::InvalidInput(_))
            | LinguaError::Profile(ProfileError::InvalidId(_))
            | LinguaError::Dialogue(DialogueError::EmptyMessage) => ApiError::BadRequest(message),
            LinguaError::Profile(ProfileError::AlreadyExists(_)) => ApiError::Conflict(message),
            LinguaError::Dialogue(DialogueError::Profile(ProfileError::NotFound(_))) => {
                ApiError::NotFound(message)
            }
            _ => ApiError::Internal(message),
        }
    }
}

impl From<DialogueError> for ApiError {
    fn from(err: DialogueError) -> Self {
        LinguaError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
