use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shortlink_service::ShortlinkError;
use tracing::{error, warn};

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Malformed or out-of-range input.
    BadRequest(String),
    NotFound(String),
    /// Backend failure or corrupt data; the detail is logged, not returned.
    Internal(String),
}

impl From<ShortlinkError> for AppError {
    fn from(err: ShortlinkError) -> Self {
        match err {
            ShortlinkError::NotFound(_) => Self::NotFound("Unknown short URL".to_string()),
            ShortlinkError::InvalidExpiration(message) => Self::BadRequest(message),
            ShortlinkError::BackendUnavailable(_) | ShortlinkError::Corrupt(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => {
                warn!(status = 400, %message, "rejecting request");
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Internal(message) => {
                error!(status = 500, %message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    StatusCode::INTERNAL_SERVER_ERROR
                        .canonical_reason()
                        .unwrap_or("Internal Server Error")
                        .to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
