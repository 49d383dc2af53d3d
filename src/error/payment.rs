use axum::http::StatusCode;
use thiserror::Error as ThisError;

/// Failures talking to the payment provider.
#[derive(Debug, ThisError)]
pub enum PaymentError {
    #[error("Payment provider request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Payment provider answered {status}: {message}")]
    UpstreamStatus { status: StatusCode, message: String },

    #[error("Payment provider payload parse error: {message}. Body: {body}")]
    Parse { message: String, body: String },

    #[error("Payment provider response is missing `{0}`")]
    MissingField(&'static str),

    #[error("Payment provider is not configured")]
    NotConfigured,
}
