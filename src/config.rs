use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "pt-BR";
pub const DEFAULT_REGION: &str = "BR";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Everything the TMDB client injects into each request.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub base_url: String,
    pub api_key: String,
    pub language: String,
    pub region: String,
    pub timeout: Duration,
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: TMDB_BASE.to_string(),
            api_key: api_key.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            region: DEFAULT_REGION.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn from_env() -> Result<Self> {
        let api_key = env::var("TMDB_API_KEY").context("TMDB_API_KEY not set")?;
        let mut config = Self::new(api_key);
        if let Some(base) = non_empty_var("TMDB_BASE_URL") {
            config = config.with_base_url(base);
        }
        if let Some(language) = non_empty_var("TMDB_LANGUAGE") {
            config.language = language;
        }
        if let Some(region) = non_empty_var("TMDB_REGION") {
            config.region = region;
        }
        Ok(config)
    }
}

pub fn listen_addr() -> Result<SocketAddr> {
    let raw = non_empty_var("CINESTORE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
    raw.parse()
        .with_context(|| format!("CINESTORE_ADDR is not a socket address: {raw}"))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
