use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkwell_reader::article::ArticleFetcher;
use inkwell_reader::config::Config;
use inkwell_reader::db::Database;
use inkwell_reader::feed::FeedFetcher;
use inkwell_reader::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkwell_reader=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Initialize database
    let db = Database::new(&config.database_url).await?;
    db.initialize().await?;
    info!("Database initialized at {}", config.database_url);

    let state = AppState {
        db: Arc::new(db),
        articles: Arc::new(ArticleFetcher::new(&config)?),
        feeds: Arc::new(FeedFetcher::new(&config)?),
    };

    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Reader API running on port {}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
