//! Error types for the fichas server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes exposed in JSON error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NoSuchFicha = 2,
    ColumnNotFound = 3,
    BadValue = 4,
    StoreReadFailure = 5,
    StoreWriteFailure = 6,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No header in the source table matches a required logical field.
    /// Carries the attempted aliases and the headers that were available,
    /// since the rest of the pipeline cannot proceed without them.
    #[error("no matching column for aliases {aliases:?} in headers {headers:?}")]
    ColumnNotFound {
        aliases: Vec<String>,
        headers: Vec<String>,
    },

    #[error("Record store read failed: {0}")]
    StoreRead(String),

    #[error("Record store write failed: {0}")]
    StoreWrite(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchFicha, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::ColumnNotFound { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::ColumnNotFound,
                self.to_string(),
            ),
            AppError::StoreRead(msg) => {
                tracing::error!("Store read error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::StoreReadFailure,
                    msg.clone(),
                )
            }
            AppError::StoreWrite(msg) => {
                tracing::error!("Store write error: {}", msg);
                (StatusCode::BAD_GATEWAY, ErrorCode::StoreWriteFailure, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
