use std::time::Instant;

use tracing::warn;

use super::api::ApiClient;
use super::state::{normalize_url_input, Action, Selection, Tab, Toast, ToastKind, ViewState};
use super::ClientError;
use crate::models::{Bookmark, NewBookmark, Source};

/// Drives the API on behalf of user actions and folds every outcome into the
/// view state. Nothing is cached: each selection re-fetches.
pub struct Controller {
    api: ApiClient,
    state: ViewState,
}

impl Controller {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: ViewState::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    fn toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.state
            .apply(Action::ShowToast(Toast::new(message, kind, Instant::now())));
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.state.apply(Action::SwitchTab(tab));
    }

    pub fn close_article(&mut self) {
        self.state.apply(Action::CloseArticle);
    }

    /// Expire the toast once its display time has passed.
    pub fn tick(&mut self, now: Instant) {
        self.state.apply(Action::Tick(now));
    }

    pub async fn load_all(&mut self) {
        self.load_sources().await;
        self.load_bookmarks().await;
    }

    pub async fn load_sources(&mut self) {
        match self.api.list_sources().await {
            Ok(sources) => self.state.apply(Action::SourcesLoaded(sources)),
            Err(e) => warn!("Failed to load sources: {}", e),
        }
    }

    pub async fn load_bookmarks(&mut self) {
        match self.api.list_bookmarks().await {
            Ok(bookmarks) => self.state.apply(Action::BookmarksLoaded(bookmarks)),
            Err(e) => warn!("Failed to load bookmarks: {}", e),
        }
    }

    pub async fn select_source(&mut self, source: Source) {
        let source_id = source.id;
        let url = source.url.clone();
        self.state.apply(Action::SelectSource(source));

        match self.api.fetch_feed(&url).await {
            Ok(feed) => self.state.apply(Action::FeedLoaded { source_id, feed }),
            Err(e) => {
                self.state.apply(Action::FeedFailed { source_id });
                self.toast(format!("Feed error: {}", e), ToastKind::Error);
            }
        }
    }

    pub async fn open_article(&mut self, selection: Selection) {
        let url = selection.url.clone();
        self.state.apply(Action::OpenArticle(selection));
        self.fetch_selected(url).await;
    }

    async fn fetch_selected(&mut self, url: String) {
        match self.api.fetch_article(&url).await {
            Ok(article) => self.state.apply(Action::ArticleLoaded { url, article }),
            Err(e) => {
                self.state.apply(Action::ArticleFailed { url });
                self.toast(format!("Article error: {}", e), ToastKind::Error);
            }
        }
    }

    /// Open a saved article, marking it read the first time.
    pub async fn open_bookmark(&mut self, bookmark: &Bookmark) {
        self.open_article(Selection::from_bookmark(bookmark)).await;

        if !bookmark.read {
            if let Err(e) = self.api.mark_read(bookmark.id).await {
                warn!("Failed to mark bookmark {} read: {}", bookmark.id, e);
            }
            self.load_bookmarks().await;
        }
    }

    /// Open whatever the user typed in the URL bar. Blank input does nothing.
    pub async fn load_url(&mut self, input: &str) {
        let Some(url) = normalize_url_input(input) else {
            return;
        };
        self.state.apply(Action::LoadUrl(url.clone()));
        self.fetch_selected(url).await;
    }

    /// Bookmark the article open in the reader pane.
    pub async fn bookmark_current(&mut self) {
        let (Some(selected), Some(article)) = (&self.state.selected, &self.state.article) else {
            return;
        };

        let bookmark = NewBookmark {
            url: selected.url.clone(),
            title: Some(article.title.clone()),
            excerpt: article.excerpt.clone(),
            source_name: selected
                .source_name
                .clone()
                .filter(|s| !s.is_empty())
                .or_else(|| article.site_name.clone()),
        };

        match self.api.add_bookmark(&bookmark).await {
            Ok(_) => {
                self.toast("Bookmarked!", ToastKind::Success);
                self.load_bookmarks().await;
            }
            Err(ClientError::AlreadyBookmarked) => {
                self.toast("Already bookmarked", ToastKind::Error);
            }
            Err(e) => {
                warn!("Failed to bookmark {}: {}", bookmark.url, e);
                self.toast("Failed to bookmark", ToastKind::Error);
            }
        }
    }

    pub async fn delete_bookmark(&mut self, id: i64) {
        if let Err(e) = self.api.delete_bookmark(id).await {
            warn!("Failed to remove bookmark {}: {}", id, e);
            self.toast("Failed to remove bookmark", ToastKind::Error);
            return;
        }
        self.load_bookmarks().await;
        self.toast("Removed", ToastKind::Success);
    }

    pub async fn add_source(&mut self, name: &str, url: &str) {
        let (name, url) = (name.trim(), url.trim());
        if name.is_empty() || url.is_empty() {
            return;
        }

        match self.api.add_source(name, url).await {
            Ok(_) => {
                self.toast(format!("Added {}", name), ToastKind::Success);
                self.load_sources().await;
            }
            Err(e) => {
                warn!("Failed to add source {}: {}", url, e);
                self.toast("Failed to add source", ToastKind::Error);
            }
        }
    }

    pub async fn delete_source(&mut self, id: i64) {
        if let Err(e) = self.api.delete_source(id).await {
            warn!("Failed to remove source {}: {}", id, e);
            self.toast("Failed to remove source", ToastKind::Error);
            return;
        }
        self.state.apply(Action::SourceRemoved(id));
        self.load_sources().await;
    }
}
