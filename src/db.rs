use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::error::{ReaderError, Result};
use crate::models::{Bookmark, NewBookmark, Source, DEFAULT_SOURCE_TYPE};

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sources (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                url TEXT NOT NULL,
                type TEXT NOT NULL DEFAULT 'rss',
                added_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // UNIQUE(url) is what makes duplicate bookmarks fail atomically
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bookmarks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL UNIQUE,
                title TEXT,
                excerpt TEXT,
                source_name TEXT,
                saved_at TEXT NOT NULL DEFAULT (datetime('now')),
                read INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_sources(&self) -> Result<Vec<Source>> {
        let sources = sqlx::query_as::<_, Source>(
            "SELECT id, name, url, type, added_at FROM sources ORDER BY added_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(sources)
    }

    pub async fn get_source(&self, id: i64) -> Result<Option<Source>> {
        let source = sqlx::query_as::<_, Source>(
            "SELECT id, name, url, type, added_at FROM sources WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(source)
    }

    pub async fn add_source(&self, name: &str, url: &str, kind: Option<&str>) -> Result<Source> {
        let kind = kind.unwrap_or(DEFAULT_SOURCE_TYPE);

        let source = sqlx::query_as::<_, Source>(
            r#"
            INSERT INTO sources (name, url, type)
            VALUES (?, ?, ?)
            RETURNING id, name, url, type, added_at
            "#,
        )
        .bind(name)
        .bind(url)
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;

        info!("Added source '{}' ({})", source.name, source.url);
        Ok(source)
    }

    /// Deleting an id that does not exist is not an error.
    pub async fn delete_source(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM sources WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() > 0 {
            info!("Deleted source {}", id);
        }
        Ok(())
    }

    pub async fn list_bookmarks(&self) -> Result<Vec<Bookmark>> {
        let bookmarks = sqlx::query_as::<_, Bookmark>(
            r#"
            SELECT id, url, title, excerpt, source_name, saved_at, read
            FROM bookmarks
            ORDER BY saved_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(bookmarks)
    }

    pub async fn get_bookmark(&self, id: i64) -> Result<Option<Bookmark>> {
        let bookmark = sqlx::query_as::<_, Bookmark>(
            r#"
            SELECT id, url, title, excerpt, source_name, saved_at, read
            FROM bookmarks
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bookmark)
    }

    /// Inserts a bookmark and returns its id. A URL that is already saved
    /// yields [`ReaderError::AlreadyBookmarked`].
    pub async fn add_bookmark(&self, bookmark: &NewBookmark) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO bookmarks (url, title, excerpt, source_name)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&bookmark.url)
        .bind(&bookmark.title)
        .bind(&bookmark.excerpt)
        .bind(&bookmark.source_name)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                ReaderError::AlreadyBookmarked
            }
            other => ReaderError::Database(other),
        })?;

        let id = result.last_insert_rowid();
        info!("Bookmarked {} as {}", bookmark.url, id);
        Ok(id)
    }

    pub async fn mark_bookmark_read(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE bookmarks SET read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Deleting an id that does not exist is not an error.
    pub async fn delete_bookmark(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() > 0 {
            info!("Deleted bookmark {}", id);
        }
        Ok(())
    }
}
