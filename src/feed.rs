use std::time::Duration;

use async_trait::async_trait;
use feed_rs::model::{Entry, Feed};
use feed_rs::parser;
use reqwest::Client;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{ReaderError, Result};
use crate::models::{FeedItem, FeedResponse};

/// Hard cap on the number of entries returned for one feed.
pub const MAX_FEED_ITEMS: usize = 30;

const SNIPPET_CHARS: usize = 300;

/// Anything that can turn a feed URL into a normalized feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FeedResponse>;
}

pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.feed_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }

    /// Parse raw RSS/Atom bytes into the response shape.
    pub fn parse(bytes: &[u8]) -> Result<FeedResponse> {
        let feed = parser::parse(bytes)?;
        Ok(Self::normalize(feed))
    }

    pub fn normalize(feed: Feed) -> FeedResponse {
        // Atom feeds usually list their rel="self" link first
        let link = feed
            .links
            .iter()
            .find(|l| l.rel.as_deref() != Some("self"))
            .or_else(|| feed.links.first())
            .map(|l| l.href.clone());

        let items = feed
            .entries
            .iter()
            .take(MAX_FEED_ITEMS)
            .map(Self::to_item)
            .collect();

        FeedResponse {
            title: feed.title.map(|t| t.content),
            description: feed.description.map(|d| d.content),
            link,
            items,
        }
    }

    pub fn to_item(entry: &Entry) -> FeedItem {
        let snippet_source = entry
            .summary
            .as_ref()
            .map(|s| s.content.as_str())
            .or_else(|| entry.content.as_ref().and_then(|c| c.body.as_deref()));

        FeedItem {
            title: entry.title.as_ref().map(|t| t.content.clone()),
            link: entry.links.first().map(|l| l.href.clone()),
            pub_date: entry.published.or(entry.updated),
            creator: entry.authors.first().map(|a| a.name.clone()),
            content_snippet: snippet_source.and_then(Self::snippet),
            categories: entry.categories.iter().map(|c| c.term.clone()).collect(),
        }
    }

    /// Plain-text preview of an HTML fragment, whitespace collapsed.
    pub fn snippet(html: &str) -> Option<String> {
        let text = match html2text::from_read(html.as_bytes(), 120) {
            Ok(t) => t,
            Err(e) => {
                warn!("Failed to convert summary to text: {}", e);
                return None;
            }
        };

        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return None;
        }

        match collapsed.char_indices().nth(SNIPPET_CHARS) {
            Some((cut, _)) => Some(format!("{}…", collapsed[..cut].trim_end())),
            None => Some(collapsed),
        }
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    async fn fetch(&self, url: &Url) -> Result<FeedResponse> {
        info!("Fetching feed: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Feed fetch for {} returned {}", url, status);
            return Err(ReaderError::FeedStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let feed = Self::parse(&bytes[..])?;

        info!("Parsed {} items from {}", feed.items.len(), url);
        Ok(feed)
    }
}
