use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{delete, get, patch, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::article::ArticleSource;
use crate::db::Database;
use crate::dto::{AddBookmarkRequest, AddSourceRequest, RowId, UrlRequest, ValidJson};
use crate::error::ApiError;
use crate::feed::FeedSource;
use crate::models::{
    ArticleRecord, Bookmark, CreatedBookmark, CreatedSource, FeedResponse, NewBookmark, Source,
    Success,
};

/// Services shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub articles: Arc<dyn ArticleSource>,
    pub feeds: Arc<dyn FeedSource>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/article", post(fetch_article))
        .route("/api/feed", post(fetch_feed))
        .route("/api/sources", get(list_sources).post(add_source))
        .route("/api/sources/:id", delete(delete_source))
        .route("/api/bookmarks", get(list_bookmarks).post(add_bookmark))
        .route("/api/bookmarks/:id/read", patch(mark_bookmark_read))
        .route("/api/bookmarks/:id", delete(delete_bookmark))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn fetch_article(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<UrlRequest>,
) -> Result<Json<ArticleRecord>, ApiError> {
    let url = req.parse_url()?;
    let article = state.articles.fetch(&url).await?;
    Ok(Json(article))
}

pub async fn fetch_feed(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<UrlRequest>,
) -> Result<Json<FeedResponse>, ApiError> {
    let url = req.parse_url()?;
    let feed = state.feeds.fetch(&url).await?;
    Ok(Json(feed))
}

pub async fn list_sources(State(state): State<AppState>) -> Result<Json<Vec<Source>>, ApiError> {
    Ok(Json(state.db.list_sources().await?))
}

pub async fn add_source(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<AddSourceRequest>,
) -> Result<Json<CreatedSource>, ApiError> {
    let name = req.name.unwrap_or_default();
    let url = req.url.unwrap_or_default();
    let kind = req.kind.as_deref().filter(|k| !k.is_empty());

    let source = state.db.add_source(name.trim(), url.trim(), kind).await?;
    Ok(Json(source.into()))
}

pub async fn delete_source(
    State(state): State<AppState>,
    RowId(id): RowId,
) -> Result<Json<Success>, ApiError> {
    if let Some(id) = id {
        state.db.delete_source(id).await?;
    }
    Ok(Json(Success::OK))
}

pub async fn list_bookmarks(
    State(state): State<AppState>,
) -> Result<Json<Vec<Bookmark>>, ApiError> {
    Ok(Json(state.db.list_bookmarks().await?))
}

pub async fn add_bookmark(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<AddBookmarkRequest>,
) -> Result<Json<CreatedBookmark>, ApiError> {
    let bookmark = NewBookmark::from(req);
    if bookmark.url.is_empty() {
        return Err(ApiError::bad_request("URL required"));
    }
    let id = state.db.add_bookmark(&bookmark).await?;
    Ok(Json(CreatedBookmark { id }))
}

pub async fn mark_bookmark_read(
    State(state): State<AppState>,
    RowId(id): RowId,
) -> Result<Json<Success>, ApiError> {
    if let Some(id) = id {
        state.db.mark_bookmark_read(id).await?;
        info!("Marked bookmark {} as read", id);
    }
    Ok(Json(Success::OK))
}

pub async fn delete_bookmark(
    State(state): State<AppState>,
    RowId(id): RowId,
) -> Result<Json<Success>, ApiError> {
    if let Some(id) = id {
        state.db.delete_bookmark(id).await?;
    }
    Ok(Json(Success::OK))
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
