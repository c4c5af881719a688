use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Wire shape for every error the API returns.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Selected time slot is fully booked")]
    SlotUnavailable,
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let body = ErrorResponse {
            success: false,
            // Database details stay in the logs, not on the wire
            error: match self {
                ApiError::Database(_) => "Internal server error".to_string(),
                other => other.to_string(),
            },
        };
        match self {
            ApiError::Validation(_) => HttpResponse::BadRequest().json(body),
            ApiError::NotFound(_) => HttpResponse::NotFound().json(body),
            ApiError::Duplicate(_) | ApiError::SlotUnavailable => {
                HttpResponse::Conflict().json(body)
            }
            ApiError::Unauthorized(_) => HttpResponse::Unauthorized().json(body),
            ApiError::Forbidden(_) => HttpResponse::Forbidden().json(body),
            ApiError::Database(_) | ApiError::Internal(_) => {
                HttpResponse::InternalServerError().json(body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("bad".into()).error_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).error_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::SlotUnavailable.error_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Unauthorized("no token".into())
                .error_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Internal("provider down".into())
                .error_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
