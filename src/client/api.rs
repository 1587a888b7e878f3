use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use super::{ClientError, ClientResult};
use crate::error::ErrorBody;
use crate::models::{
    ArticleRecord, Bookmark, CreatedBookmark, CreatedSource, FeedResponse, NewBookmark, Source,
    Success,
};

pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Typed client for the reader HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let mut base = Url::parse(base_url)?;
        // Keep any path prefix when endpoints are joined onto the base
        if !base.path().ends_with('/') {
            let prefixed = format!("{}/", base.path());
            base.set_path(&prefixed);
        }

        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    /// Base URL from `READER_API_URL`, falling back to the local server.
    pub fn from_env() -> ClientResult<Self> {
        let base = std::env::var("READER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        Self::new(&base)
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    pub async fn fetch_article(&self, url: &str) -> ClientResult<ArticleRecord> {
        let response = self
            .client
            .post(self.endpoint("/api/article")?)
            .json(&json!({ "url": url }))
            .send()
            .await?;
        decode(response, "Failed to fetch article").await
    }

    pub async fn fetch_feed(&self, url: &str) -> ClientResult<FeedResponse> {
        let response = self
            .client
            .post(self.endpoint("/api/feed")?)
            .json(&json!({ "url": url }))
            .send()
            .await?;
        decode(response, "Failed to fetch feed").await
    }

    pub async fn list_sources(&self) -> ClientResult<Vec<Source>> {
        let response = self.client.get(self.endpoint("/api/sources")?).send().await?;
        decode(response, "Failed to load sources").await
    }

    pub async fn add_source(&self, name: &str, url: &str) -> ClientResult<CreatedSource> {
        let response = self
            .client
            .post(self.endpoint("/api/sources")?)
            .json(&json!({ "name": name, "url": url, "type": "rss" }))
            .send()
            .await?;
        decode(response, "Failed to add source").await
    }

    pub async fn delete_source(&self, id: i64) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.endpoint(&format!("/api/sources/{}", id))?)
            .send()
            .await?;
        decode::<Success>(response, "Failed to remove source").await?;
        Ok(())
    }

    pub async fn list_bookmarks(&self) -> ClientResult<Vec<Bookmark>> {
        let response = self
            .client
            .get(self.endpoint("/api/bookmarks")?)
            .send()
            .await?;
        decode(response, "Failed to load bookmarks").await
    }

    pub async fn add_bookmark(&self, bookmark: &NewBookmark) -> ClientResult<i64> {
        let response = self
            .client
            .post(self.endpoint("/api/bookmarks")?)
            .json(bookmark)
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(ClientError::AlreadyBookmarked);
        }
        let created: CreatedBookmark = decode(response, "Failed to bookmark").await?;
        Ok(created.id)
    }

    pub async fn mark_read(&self, id: i64) -> ClientResult<()> {
        let response = self
            .client
            .patch(self.endpoint(&format!("/api/bookmarks/{}/read", id))?)
            .send()
            .await?;
        decode::<Success>(response, "Failed to mark bookmark read").await?;
        Ok(())
    }

    pub async fn delete_bookmark(&self, id: i64) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.endpoint(&format!("/api/bookmarks/{}", id))?)
            .send()
            .await?;
        decode::<Success>(response, "Failed to remove bookmark").await?;
        Ok(())
    }
}

/// Decode a success body, or turn an error status into [`ClientError::Api`]
/// carrying the server's message (or `fallback` when it sent none).
async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| fallback.to_string());

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
