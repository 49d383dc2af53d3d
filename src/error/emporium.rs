use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;
use tracing::error;

use super::{AssetError, AuthError, PaymentError};

#[derive(Debug, ThisError)]
pub enum EmporiumError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl EmporiumError {
    pub fn validation(message: impl Into<String>) -> Self {
        EmporiumError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        EmporiumError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        EmporiumError::Conflict(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            EmporiumError::Validation(_) | EmporiumError::Conflict(_) => StatusCode::BAD_REQUEST,
            EmporiumError::NotFound(_) => StatusCode::NOT_FOUND,
            EmporiumError::Asset(_)
            | EmporiumError::Payment(_)
            | EmporiumError::Auth(_)
            | EmporiumError::JsonError(_)
            | EmporiumError::DatabaseError(_)
            | EmporiumError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for EmporiumError {
    fn from(e: sqlx::Error) -> Self {
        let unique = e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if unique {
            return EmporiumError::Conflict("Record already exists".to_string());
        }
        EmporiumError::DatabaseError(e)
    }
}

impl From<JsonRejection> for EmporiumError {
    fn from(e: JsonRejection) -> Self {
        EmporiumError::Validation(e.body_text())
    }
}

impl From<QueryRejection> for EmporiumError {
    fn from(e: QueryRejection) -> Self {
        EmporiumError::Validation(e.body_text())
    }
}

impl From<PathRejection> for EmporiumError {
    fn from(e: PathRejection) -> Self {
        EmporiumError::Validation(e.body_text())
    }
}

impl From<MultipartError> for EmporiumError {
    fn from(e: MultipartError) -> Self {
        EmporiumError::Validation(e.body_text())
    }
}

impl IntoResponse for EmporiumError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self {
            EmporiumError::Validation(message)
            | EmporiumError::NotFound(message)
            | EmporiumError::Conflict(message) => message,

            EmporiumError::Asset(e) => {
                error!(error = %e, "Image host call failed");
                "Image host error.".to_string()
            }

            EmporiumError::Payment(e) => {
                error!(error = %e, "Payment provider call failed");
                "Payment provider error.".to_string()
            }

            other => {
                error!(error = %other, "Request failed with an internal error");
                "An internal server error occurred.".to_string()
            }
        };

        (
            status,
            Json(ApiErrorBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

/// Standardized error envelope: `{"success":false,"message":"..."}`.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn not_found_renders_failure_envelope() {
        let resp = EmporiumError::not_found("Category doesnt exist").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        assert_eq!(
            std::str::from_utf8(&body).expect("utf-8 body"),
            r#"{"success":false,"message":"Category doesnt exist"}"#
        );
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let resp = EmporiumError::UnexpectedError("db path /var/x".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = std::str::from_utf8(&body).expect("utf-8 body");
        assert!(!body.contains("/var/x"));
    }

    #[test]
    fn conflict_maps_to_bad_request() {
        assert_eq!(
            EmporiumError::conflict("dup").status(),
            StatusCode::BAD_REQUEST
        );
    }
}
