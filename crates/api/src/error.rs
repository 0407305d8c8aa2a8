use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use infra::store::StoreError;
use serde::Serialize;
use thiserror::Error;

use crate::domains::progression::ProgressionError;
use crate::domains::teams::TeamServiceError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unprocessable: {0}")]
    Unprocessable(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => AppError::NotFound(e.to_string()),
            StoreError::Conflict(_) => AppError::Conflict(e.to_string()),
            StoreError::Constraint(_) => AppError::Conflict(e.to_string()),
            StoreError::Db(e) => AppError::Db(e),
        }
    }
}

impl From<ProgressionError> for AppError {
    fn from(e: ProgressionError) -> Self {
        match e {
            ProgressionError::NotFound(_) => AppError::NotFound(e.to_string()),
            ProgressionError::IncompletePrerequisite { .. } => {
                AppError::Unprocessable(e.to_string())
            }
            ProgressionError::AlreadyDecided(_)
            | ProgressionError::SlotsFull(_)
            | ProgressionError::DuplicateAssignment { .. } => AppError::Conflict(e.to_string()),
            ProgressionError::Store(e) => e.into(),
        }
    }
}

impl From<TeamServiceError> for AppError {
    fn from(e: TeamServiceError) -> Self {
        match e {
            TeamServiceError::TeamNotFound(_) | TeamServiceError::NotMember { .. } => {
                AppError::NotFound(e.to_string())
            }
            TeamServiceError::Db(e) => AppError::Db(e),
        }
    }
}
