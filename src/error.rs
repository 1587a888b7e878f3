use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, ReaderError>;

#[derive(Debug, Error)]
pub enum ReaderError {
    /// Missing or malformed input, rejected before any work is done.
    #[error("{0}")]
    Validation(String),

    #[error("Already bookmarked")]
    AlreadyBookmarked,

    /// Article page answered with a non-2xx status.
    #[error("HTTP {0}")]
    HttpStatus(u16),

    /// Feed URL answered with a non-2xx status.
    #[error("Status code {0}")]
    FeedStatus(u16),

    /// The page was fetched but no readable article could be extracted.
    #[error("Could not parse article")]
    Unreadable,

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    FeedParse(#[from] feed_rs::parser::ParseFeedError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

/// Body of every failed API response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ReaderError> for ApiError {
    fn from(err: ReaderError) -> Self {
        match err {
            ReaderError::Validation(msg) => ApiError::bad_request(msg),
            ReaderError::AlreadyBookmarked => ApiError::conflict(err.to_string()),
            other => {
                error!("Request failed: {}", other);
                ApiError::internal(other.to_string())
            }
        }
    }
}
