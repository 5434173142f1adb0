use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use taskdeck_shared::{ErrorResponse, ValidationError};
use thiserror::Error;

/// Errors returned to HTTP callers. Service failures carry only a fixed,
/// caller-safe message; the underlying cause is logged where it happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Service(&'static str),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}
