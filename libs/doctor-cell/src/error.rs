use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record conflicts with an existing one: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(DatabaseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected store response: {0}")]
    Unexpected(String),
}

impl From<DatabaseError> for StoreError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Conflict(detail) => StoreError::Conflict(detail),
            other => StoreError::Database(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Doctor profile already exists")]
    AlreadyExists,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DoctorError> for AppError {
    fn from(error: DoctorError) -> Self {
        match error {
            DoctorError::DoctorNotFound | DoctorError::UserNotFound => AppError::NotFound(error.to_string()),
            DoctorError::AlreadyExists => AppError::Conflict(error.to_string()),
            DoctorError::Store(inner) => AppError::Internal(inner.to_string()),
        }
    }
}
