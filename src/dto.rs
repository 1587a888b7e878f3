//! Request bodies accepted by the HTTP API, validated before they reach a
//! handler.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;
use crate::models::NewBookmark;

/// A JSON extractor that rejects bodies failing [`Validate`] with a 400.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        value.validate().map_err(validation_message)?;

        Ok(ValidJson(value))
    }
}

fn validation_message(errors: ValidationErrors) -> ApiError {
    let message = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid request".to_string());
    ApiError::bad_request(message)
}

/// Row id taken from the `:id` path segment. A segment that is not an
/// integer cannot name a row, so it extracts as `None` and the handler treats
/// it as a miss.
pub struct RowId(pub Option<i64>);

#[async_trait]
impl<S> FromRequestParts<S> for RowId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Ok(RowId(raw.trim().parse().ok()))
    }
}

/// Parse a user supplied URL, accepting only http and https.
pub fn parse_http_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim()).map_err(|e| ApiError::bad_request(format!("Invalid URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::bad_request(format!(
            "Unsupported URL scheme: {}",
            other
        ))),
    }
}

/// Body of `POST /api/article` and `POST /api/feed`.
#[derive(Debug, Deserialize, Validate)]
pub struct UrlRequest {
    #[validate(
        required(message = "URL required"),
        length(min = 1, message = "URL required")
    )]
    pub url: Option<String>,
}

impl UrlRequest {
    pub fn parse_url(&self) -> Result<Url, ApiError> {
        parse_http_url(self.url.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddSourceRequest {
    #[validate(
        required(message = "Name and URL required"),
        length(min = 1, message = "Name and URL required")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Name and URL required"),
        length(min = 1, message = "Name and URL required")
    )]
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddBookmarkRequest {
    #[validate(
        required(message = "URL required"),
        length(min = 1, message = "URL required")
    )]
    pub url: Option<String>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub source_name: Option<String>,
}

impl From<AddBookmarkRequest> for NewBookmark {
    fn from(req: AddBookmarkRequest) -> Self {
        NewBookmark {
            url: req.url.as_deref().unwrap_or_default().trim().to_string(),
            title: req.title,
            excerpt: req.excerpt,
            source_name: req.source_name,
        }
    }
}
