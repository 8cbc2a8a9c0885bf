//! # Task API Errors
//!
//! Error types for the task routes and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Result type for task handlers
pub type ApiResult<T> = Result<T, TaskApiError>;

/// Task API errors
#[derive(Debug, Error)]
pub enum TaskApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Path id is empty
    #[error("Id not provided")]
    MissingId,

    /// Path segment could not be decoded
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// `title` or `description` absent or empty
    #[error("Title or description not provided")]
    MissingFields,

    /// Body is not a JSON object of strings
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// No record with the requested id
    #[error("Record not found")]
    NotFound,

    /// Export requested while there are no active tasks
    #[error("No tasks found to export")]
    NothingToExport,

    /// Completion requested for a task that is already completed
    #[error("Task already completed")]
    AlreadyCompleted,

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Writing the CSV export failed
    #[error("Failed to export tasks to CSV: {0}")]
    Export(String),

    /// The record store could not persist the change
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl TaskApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            TaskApiError::MissingId => StatusCode::BAD_REQUEST,
            TaskApiError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            TaskApiError::MissingFields => StatusCode::BAD_REQUEST,
            TaskApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,

            TaskApiError::NotFound => StatusCode::NOT_FOUND,
            TaskApiError::NothingToExport => StatusCode::NOT_FOUND,

            TaskApiError::AlreadyCompleted => StatusCode::CONFLICT,

            TaskApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TaskApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&TaskApiError> for ErrorResponse {
    fn from(err: &TaskApiError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
