// Error type shared by the HTTP handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file uploaded.")]
    NoFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("File too large")]
    TooLarge,

    #[error("Error uploading file")]
    Upload(#[source] StorageError),

    #[error("Error fetching images")]
    List(#[source] StorageError),

    #[error("Error deleting image")]
    Delete(#[source] StorageError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NoFile | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upload(_) | AppError::List(_) | AppError::Delete(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Upload(cause) | AppError::List(cause) | AppError::Delete(cause) = &self {
            error!("{}: {}", self, cause);
        }
        // Clients get the generic message only
        (status, self.to_string()).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
