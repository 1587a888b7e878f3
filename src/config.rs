use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "reader.toml";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Timeout for article page fetches, in seconds
    #[serde(default = "default_article_timeout")]
    pub article_timeout_secs: u64,
    /// Timeout for feed fetches, in seconds
    #[serde(default = "default_feed_timeout")]
    pub feed_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_port() -> u16 {
    3001
}

fn default_database_url() -> String {
    "sqlite:reader.db?mode=rwc".to_string()
}

fn default_article_timeout() -> u64 {
    15
}

fn default_feed_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; ReaderApp/1.0)".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            database_url: default_database_url(),
            article_timeout_secs: default_article_timeout(),
            feed_timeout_secs: default_feed_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load the file named by `READER_CONFIG` (defaults apply when it does
    /// not exist), then apply `PORT` and `DATABASE_URL` overrides.
    pub fn from_env() -> anyhow::Result<Self> {
        let path = std::env::var("READER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let config = if Path::new(&path).exists() {
            Self::load(&path).with_context(|| format!("failed to load {}", path))?
        } else {
            Self::default()
        };

        config.with_overrides(
            std::env::var("PORT").ok().as_deref(),
            std::env::var("DATABASE_URL").ok().as_deref(),
        )
    }

    pub fn with_overrides(
        mut self,
        port: Option<&str>,
        database_url: Option<&str>,
    ) -> anyhow::Result<Self> {
        if let Some(port) = port {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT value: {:?}", port))?;
        }
        if let Some(url) = database_url {
            self.database_url = url.to_string();
        }
        Ok(self)
    }
}
