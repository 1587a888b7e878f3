//! View state of the reader client.
//!
//! Every change goes through [`ViewState::apply`] with a named [`Action`], so
//! the effect of each user-visible transition on every field lives in one
//! place.

use std::time::{Duration, Instant};

use crate::models::{ArticleRecord, Bookmark, FeedItem, FeedResponse, Source};

/// How long a toast stays visible.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Feeds,
    Bookmarks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind, shown_at: Instant) -> Self {
        Self {
            message: message.into(),
            kind,
            shown_at,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= TOAST_DURATION
    }
}

/// The item the reader pane is showing (or loading).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub url: String,
    pub title: Option<String>,
    pub source_name: Option<String>,
}

impl Selection {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn from_bookmark(bookmark: &Bookmark) -> Self {
        Self {
            url: bookmark.url.clone(),
            title: bookmark.title.clone(),
            source_name: bookmark.source_name.clone(),
        }
    }
}

/// A feed item tagged with the name of the source it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub item: FeedItem,
    pub source_name: String,
}

impl FeedEntry {
    pub fn selection(&self) -> Option<Selection> {
        let link = self.item.link.clone()?;
        Some(Selection {
            url: link,
            title: self.item.title.clone(),
            source_name: Some(self.source_name.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SwitchTab(Tab),
    SourcesLoaded(Vec<Source>),
    BookmarksLoaded(Vec<Bookmark>),
    /// A source was picked; its feed is now loading.
    SelectSource(Source),
    FeedLoaded { source_id: i64, feed: FeedResponse },
    FeedFailed { source_id: i64 },
    /// An article was picked; it is now loading.
    OpenArticle(Selection),
    ArticleLoaded { url: String, article: ArticleRecord },
    ArticleFailed { url: String },
    CloseArticle,
    /// A URL typed by the user; leaves any feed and opens the article.
    LoadUrl(String),
    SourceRemoved(i64),
    ShowToast(Toast),
    Tick(Instant),
}

/// What the main pane should render for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainView {
    LoadingArticle,
    Reader,
    LoadingFeed,
    FeedList,
    BookmarkList,
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub tab: Tab,
    pub sources: Vec<Source>,
    pub bookmarks: Vec<Bookmark>,
    pub active_source: Option<Source>,
    pub feed_items: Vec<FeedEntry>,
    pub feed_loading: bool,
    pub selected: Option<Selection>,
    pub article: Option<ArticleRecord>,
    pub article_loading: bool,
    pub toast: Option<Toast>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SwitchTab(tab) => self.tab = tab,
            Action::SourcesLoaded(sources) => self.sources = sources,
            Action::BookmarksLoaded(bookmarks) => self.bookmarks = bookmarks,
            Action::SelectSource(source) => {
                self.active_source = Some(source);
                self.feed_items.clear();
                self.selected = None;
                self.article = None;
                self.feed_loading = true;
            }
            Action::FeedLoaded { source_id, feed } => {
                let Some(source) = self.active_source.as_ref().filter(|s| s.id == source_id)
                else {
                    return;
                };
                let source_name = source.name.clone();
                self.feed_items = feed
                    .items
                    .into_iter()
                    .map(|item| FeedEntry {
                        item,
                        source_name: source_name.clone(),
                    })
                    .collect();
                self.feed_loading = false;
            }
            Action::FeedFailed { source_id } => {
                if self.is_active_source(source_id) {
                    self.feed_loading = false;
                }
            }
            Action::OpenArticle(selection) => self.open(selection),
            Action::ArticleLoaded { url, article } => {
                if self.is_selected(&url) {
                    self.article = Some(article);
                    self.article_loading = false;
                }
            }
            Action::ArticleFailed { url } => {
                if self.is_selected(&url) {
                    self.article_loading = false;
                }
            }
            Action::CloseArticle => {
                self.article = None;
                self.selected = None;
            }
            Action::LoadUrl(url) => {
                self.active_source = None;
                self.feed_items.clear();
                self.feed_loading = false;
                self.open(Selection::new(url));
            }
            Action::SourceRemoved(id) => {
                if self.is_active_source(id) {
                    self.active_source = None;
                    self.feed_items.clear();
                    self.feed_loading = false;
                }
                self.sources.retain(|s| s.id != id);
            }
            Action::ShowToast(toast) => self.toast = Some(toast),
            Action::Tick(now) => {
                if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
                    self.toast = None;
                }
            }
        }
    }

    fn open(&mut self, selection: Selection) {
        self.selected = Some(selection);
        self.article = None;
        self.article_loading = true;
    }

    fn is_active_source(&self, id: i64) -> bool {
        self.active_source.as_ref().is_some_and(|s| s.id == id)
    }

    fn is_selected(&self, url: &str) -> bool {
        self.selected.as_ref().is_some_and(|s| s.url == url)
    }

    /// Whether the selected article is already in the bookmark list.
    pub fn is_bookmarked(&self) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|s| self.bookmarks.iter().any(|b| b.url == s.url))
    }

    pub fn unread_count(&self) -> usize {
        self.bookmarks.iter().filter(|b| !b.read).count()
    }

    pub fn main_view(&self) -> MainView {
        if self.article_loading {
            MainView::LoadingArticle
        } else if self.article.is_some() && self.selected.is_some() {
            MainView::Reader
        } else if self.feed_loading {
            MainView::LoadingFeed
        } else if !self.feed_items.is_empty() {
            MainView::FeedList
        } else if self.tab == Tab::Bookmarks && !self.bookmarks.is_empty() {
            MainView::BookmarkList
        } else {
            MainView::Empty
        }
    }
}

/// Normalize what the user typed into the URL bar. Blank input yields `None`;
/// anything not starting with `http` gets an `https://` prefix.
pub fn normalize_url_input(input: &str) -> Option<String> {
    let url = input.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("http") {
        Some(url.to_string())
    } else {
        Some(format!("https://{}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: i64, name: &str) -> Source {
        Source {
            id,
            name: name.to_string(),
            url: format!("https://{}.example/rss", name.to_lowercase()),
            kind: "rss".to_string(),
            added_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    fn bookmark(id: i64, url: &str, read: bool) -> Bookmark {
        Bookmark {
            id,
            url: url.to_string(),
            title: Some(format!("Bookmark {}", id)),
            excerpt: None,
            source_name: Some("Example".to_string()),
            saved_at: "2024-01-01 00:00:00".to_string(),
            read,
        }
    }

    fn feed(titles: &[&str]) -> FeedResponse {
        FeedResponse {
            title: Some("Feed".to_string()),
            items: titles
                .iter()
                .map(|t| FeedItem {
                    title: Some(t.to_string()),
                    link: Some(format!("https://a.example/{}", t)),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn article(title: &str, url: &str) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            byline: None,
            content: "<p>Body</p>".to_string(),
            excerpt: Some("Body".to_string()),
            site_name: Some("Example".to_string()),
            length: 4,
            url: url.to_string(),
        }
    }

    mod source_transitions {
        use super::*;

        #[test]
        fn test_select_source_resets_reader() {
            let mut state = ViewState::new();
            state.apply(Action::OpenArticle(Selection::new("https://a.example/x")));
            state.apply(Action::ArticleLoaded {
                url: "https://a.example/x".to_string(),
                article: article("X", "https://a.example/x"),
            });

            state.apply(Action::SelectSource(source(1, "Tech")));

            assert_eq!(state.active_source.as_ref().map(|s| s.id), Some(1));
            assert!(state.feed_loading);
            assert!(state.feed_items.is_empty());
            assert!(state.selected.is_none());
            assert!(state.article.is_none());
            assert_eq!(state.main_view(), MainView::LoadingFeed);
        }

        #[test]
        fn test_feed_loaded_tags_items_with_source() {
            let mut state = ViewState::new();
            state.apply(Action::SelectSource(source(1, "Tech")));
            state.apply(Action::FeedLoaded {
                source_id: 1,
                feed: feed(&["one", "two"]),
            });

            assert!(!state.feed_loading);
            assert_eq!(state.feed_items.len(), 2);
            assert_eq!(state.feed_items[0].source_name, "Tech");
            assert_eq!(state.feed_items[0].item.title.as_deref(), Some("one"));
            assert_eq!(state.main_view(), MainView::FeedList);
        }

        #[test]
        fn test_stale_feed_is_ignored() {
            let mut state = ViewState::new();
            state.apply(Action::SelectSource(source(1, "Tech")));
            state.apply(Action::SelectSource(source(2, "News")));

            state.apply(Action::FeedLoaded {
                source_id: 1,
                feed: feed(&["old"]),
            });

            assert!(state.feed_items.is_empty());
            assert!(state.feed_loading);
        }

        #[test]
        fn test_feed_failed_stops_loading() {
            let mut state = ViewState::new();
            state.apply(Action::SelectSource(source(1, "Tech")));
            state.apply(Action::FeedFailed { source_id: 1 });

            assert!(!state.feed_loading);
            assert_eq!(state.main_view(), MainView::Empty);
        }

        #[test]
        fn test_removing_active_source_clears_feed() {
            let mut state = ViewState::new();
            state.apply(Action::SourcesLoaded(vec![source(1, "Tech"), source(2, "News")]));
            state.apply(Action::SelectSource(source(1, "Tech")));
            state.apply(Action::FeedLoaded {
                source_id: 1,
                feed: feed(&["one"]),
            });

            state.apply(Action::SourceRemoved(1));

            assert!(state.active_source.is_none());
            assert!(state.feed_items.is_empty());
            assert_eq!(state.sources.len(), 1);
        }

        #[test]
        fn test_removing_other_source_keeps_feed() {
            let mut state = ViewState::new();
            state.apply(Action::SourcesLoaded(vec![source(1, "Tech"), source(2, "News")]));
            state.apply(Action::SelectSource(source(1, "Tech")));
            state.apply(Action::FeedLoaded {
                source_id: 1,
                feed: feed(&["one"]),
            });

            state.apply(Action::SourceRemoved(2));

            assert!(state.active_source.is_some());
            assert_eq!(state.feed_items.len(), 1);
        }
    }

    mod article_transitions {
        use super::*;

        #[test]
        fn test_open_then_load_article() {
            let mut state = ViewState::new();
            state.apply(Action::OpenArticle(Selection::new("https://a.example/x")));
            assert_eq!(state.main_view(), MainView::LoadingArticle);

            state.apply(Action::ArticleLoaded {
                url: "https://a.example/x".to_string(),
                article: article("X", "https://a.example/x"),
            });

            assert!(!state.article_loading);
            assert_eq!(state.article.as_ref().map(|a| a.title.as_str()), Some("X"));
            assert_eq!(state.main_view(), MainView::Reader);
        }

        #[test]
        fn test_stale_article_is_ignored() {
            let mut state = ViewState::new();
            state.apply(Action::OpenArticle(Selection::new("https://a.example/x")));
            state.apply(Action::OpenArticle(Selection::new("https://a.example/y")));

            state.apply(Action::ArticleLoaded {
                url: "https://a.example/x".to_string(),
                article: article("X", "https://a.example/x"),
            });

            assert!(state.article.is_none());
            assert!(state.article_loading);
        }

        #[test]
        fn test_article_failed_keeps_feed_list() {
            let mut state = ViewState::new();
            state.apply(Action::SelectSource(source(1, "Tech")));
            state.apply(Action::FeedLoaded {
                source_id: 1,
                feed: feed(&["one"]),
            });
            state.apply(Action::OpenArticle(Selection::new("https://a.example/one")));
            state.apply(Action::ArticleFailed {
                url: "https://a.example/one".to_string(),
            });

            assert!(!state.article_loading);
            assert!(state.article.is_none());
            assert_eq!(state.main_view(), MainView::FeedList);
        }

        #[test]
        fn test_close_article() {
            let mut state = ViewState::new();
            state.apply(Action::OpenArticle(Selection::new("https://a.example/x")));
            state.apply(Action::ArticleLoaded {
                url: "https://a.example/x".to_string(),
                article: article("X", "https://a.example/x"),
            });

            state.apply(Action::CloseArticle);

            assert!(state.article.is_none());
            assert!(state.selected.is_none());
        }

        #[test]
        fn test_load_url_leaves_feed() {
            let mut state = ViewState::new();
            state.apply(Action::SelectSource(source(1, "Tech")));
            state.apply(Action::FeedLoaded {
                source_id: 1,
                feed: feed(&["one"]),
            });

            state.apply(Action::LoadUrl("https://b.example/post".to_string()));

            assert!(state.active_source.is_none());
            assert!(state.feed_items.is_empty());
            assert_eq!(
                state.selected.as_ref().map(|s| s.url.as_str()),
                Some("https://b.example/post")
            );
            assert!(state.article_loading);
        }

        #[test]
        fn test_feed_entry_selection() {
            let entry = FeedEntry {
                item: FeedItem {
                    title: Some("Post".to_string()),
                    link: Some("https://a.example/post".to_string()),
                    ..Default::default()
                },
                source_name: "Tech".to_string(),
            };

            let selection = entry.selection().unwrap();
            assert_eq!(selection.url, "https://a.example/post");
            assert_eq!(selection.source_name.as_deref(), Some("Tech"));

            let no_link = FeedEntry {
                item: FeedItem::default(),
                source_name: "Tech".to_string(),
            };
            assert!(no_link.selection().is_none());
        }
    }

    mod bookmark_queries {
        use super::*;

        #[test]
        fn test_is_bookmarked() {
            let mut state = ViewState::new();
            state.apply(Action::BookmarksLoaded(vec![bookmark(
                1,
                "https://a.example/x",
                false,
            )]));
            assert!(!state.is_bookmarked());

            state.apply(Action::OpenArticle(Selection::new("https://a.example/x")));
            assert!(state.is_bookmarked());

            state.apply(Action::OpenArticle(Selection::new("https://a.example/y")));
            assert!(!state.is_bookmarked());
        }

        #[test]
        fn test_unread_count() {
            let mut state = ViewState::new();
            state.apply(Action::BookmarksLoaded(vec![
                bookmark(1, "https://a.example/1", false),
                bookmark(2, "https://a.example/2", true),
                bookmark(3, "https://a.example/3", false),
            ]));
            assert_eq!(state.unread_count(), 2);
        }

        #[test]
        fn test_bookmark_tab_view() {
            let mut state = ViewState::new();
            assert_eq!(state.main_view(), MainView::Empty);

            state.apply(Action::BookmarksLoaded(vec![bookmark(
                1,
                "https://a.example/1",
                false,
            )]));
            assert_eq!(state.main_view(), MainView::Empty);

            state.apply(Action::SwitchTab(Tab::Bookmarks));
            assert_eq!(state.main_view(), MainView::BookmarkList);
        }

        #[test]
        fn test_from_bookmark_selection() {
            let selection = Selection::from_bookmark(&bookmark(4, "https://a.example/4", true));
            assert_eq!(selection.url, "https://a.example/4");
            assert_eq!(selection.title.as_deref(), Some("Bookmark 4"));
            assert_eq!(selection.source_name.as_deref(), Some("Example"));
        }
    }

    mod toast_transitions {
        use super::*;

        #[test]
        fn test_toast_expires_after_three_seconds() {
            let start = Instant::now();
            let mut state = ViewState::new();
            state.apply(Action::ShowToast(Toast::new(
                "Bookmarked!",
                ToastKind::Success,
                start,
            )));

            state.apply(Action::Tick(start + Duration::from_millis(2999)));
            assert!(state.toast.is_some());

            state.apply(Action::Tick(start + TOAST_DURATION));
            assert!(state.toast.is_none());
        }

        #[test]
        fn test_new_toast_replaces_old() {
            let start = Instant::now();
            let mut state = ViewState::new();
            state.apply(Action::ShowToast(Toast::new("first", ToastKind::Success, start)));
            state.apply(Action::ShowToast(Toast::new(
                "second",
                ToastKind::Error,
                start + Duration::from_secs(2),
            )));

            // The first toast would have expired by now, the second has not
            state.apply(Action::Tick(start + Duration::from_secs(4)));
            let toast = state.toast.as_ref().unwrap();
            assert_eq!(toast.message, "second");
            assert_eq!(toast.kind, ToastKind::Error);
        }
    }

    mod url_input_tests {
        use super::*;

        #[test]
        fn test_blank_input() {
            assert_eq!(normalize_url_input(""), None);
            assert_eq!(normalize_url_input("   "), None);
        }

        #[test]
        fn test_adds_https_prefix() {
            assert_eq!(
                normalize_url_input(" example.com/post "),
                Some("https://example.com/post".to_string())
            );
        }

        #[test]
        fn test_keeps_existing_scheme() {
            assert_eq!(
                normalize_url_input("http://example.com"),
                Some("http://example.com".to_string())
            );
        }
    }
}
