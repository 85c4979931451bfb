use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum WaypostError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("invalid credentials")]
    Unauthorized,

    #[error("too many login attempts")]
    RateLimited,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] SqlxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("password hash error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for WaypostError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            WaypostError::Validation(errors) => {
                let body = ApiErrorBody {
                    code: "VALIDATION".to_string(),
                    message: "Request validation failed.".to_string(),
                    details: Some(errors),
                };
                (StatusCode::BAD_REQUEST, body)
            }
            WaypostError::Unauthorized => {
                let body = ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "Invalid credentials.".to_string(),
                    details: None,
                };
                (StatusCode::UNAUTHORIZED, body)
            }
            WaypostError::RateLimited => {
                let body = ApiErrorBody {
                    code: "RATE_LIMITED".to_string(),
                    message: "Too many login attempts, please try again later.".to_string(),
                    details: None,
                };
                (StatusCode::TOO_MANY_REQUESTS, body)
            }
            WaypostError::NotFound(what) => {
                let body = ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{what} not found."),
                    details: None,
                };
                (StatusCode::NOT_FOUND, body)
            }
            e @ (WaypostError::Database(_)
            | WaypostError::Json(_)
            | WaypostError::PasswordHash(_)
            | WaypostError::Io(_)) => {
                // Log the real cause server-side; the wire body stays opaque.
                error!(error = %e, "internal error");
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                    details: None,
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
