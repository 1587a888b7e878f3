//! Records shared by the server and the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Type tag assigned to a source when none is given.
pub const DEFAULT_SOURCE_TYPE: &str = "rss";

/// A subscribed RSS/Atom feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub added_at: String,
}

/// A saved article, keyed by its URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Bookmark {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub source_name: Option<String>,
    pub saved_at: String,
    pub read: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBookmark {
    pub url: String,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub source_name: Option<String>,
}

/// Readable content extracted from a web page. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub title: String,
    pub byline: Option<String>,
    pub content: String,
    pub excerpt: Option<String>,
    pub site_name: Option<String>,
    pub length: usize,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub creator: Option<String>,
    pub content_snippet: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedResponse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub items: Vec<FeedItem>,
}

/// Echo returned after a source is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedSource {
    pub id: i64,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<Source> for CreatedSource {
    fn from(source: Source) -> Self {
        Self {
            id: source.id,
            name: source.name,
            url: source.url,
            kind: source.kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBookmark {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub const OK: Success = Success { success: true };
}
