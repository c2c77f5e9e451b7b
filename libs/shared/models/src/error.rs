use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Body returned for every 500; the underlying cause is only logged.
pub const GENERIC_SERVER_ERROR: &str = "Server error";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // Existing-record conflicts are reported to clients as 400.
            AppError::BadRequest(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Conflict(msg) => {
                tracing::debug!("Request failed: {}: {}", status, msg);
                msg
            }
            AppError::Internal(detail) => {
                tracing::error!("Error: {}: {}", status, detail);
                GENERIC_SERVER_ERROR.to_string()
            }
        };

        ApiResponse::failure(status, message).into_response()
    }
}
