use axum::http::StatusCode;
use thiserror::Error as ThisError;

/// Failures talking to the image host.
#[derive(Debug, ThisError)]
pub enum AssetError {
    #[error("Image host request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Image host answered {status}: {message}")]
    UpstreamStatus { status: StatusCode, message: String },

    #[error("Image host payload parse error: {message}. Body: {body}")]
    Parse { message: String, body: String },

    #[error("Image host refused to release {public_id}: {result}")]
    Rejected { public_id: String, result: String },

    #[error("Image host limiter closed")]
    LimiterClosed,
}
