use std::time::Duration;

use async_trait::async_trait;
use dom_smoothie::Readability;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{ReaderError, Result};
use crate::models::ArticleRecord;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";

/// Anything that can turn a page URL into a readable article.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<ArticleRecord>;
}

pub struct ArticleFetcher {
    client: Client,
}

impl ArticleFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.article_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Run readable-content extraction over `html`, resolving relative links
    /// against `url`.
    pub fn extract(html: String, url: &Url) -> Result<ArticleRecord> {
        let mut readability =
            Readability::new(html, Some(url.as_str()), None).map_err(|e| {
                warn!("Could not build document for {}: {}", url, e);
                ReaderError::Unreadable
            })?;

        let article = readability.parse().map_err(|e| {
            warn!("Extraction failed for {}: {}", url, e);
            ReaderError::Unreadable
        })?;

        if article.text_content.trim().is_empty() {
            return Err(ReaderError::Unreadable);
        }

        Ok(ArticleRecord {
            title: article.title.to_string(),
            byline: article.byline.map(|b| b.to_string()),
            content: article.content.to_string(),
            excerpt: article.excerpt.map(|e| e.to_string()),
            site_name: article.site_name.map(|s| s.to_string()),
            length: article.length,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ArticleSource for ArticleFetcher {
    async fn fetch(&self, url: &Url) -> Result<ArticleRecord> {
        info!("Fetching article: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Article fetch for {} returned {}", url, status);
            return Err(ReaderError::HttpStatus(status.as_u16()));
        }

        let html = response.text().await?;

        // Extraction walks the whole DOM, keep it off the async workers
        let page_url = url.clone();
        tokio::task::spawn_blocking(move || Self::extract(html, &page_url))
            .await
            .map_err(|e| ReaderError::Internal(format!("extraction task failed: {}", e)))?
    }
}
