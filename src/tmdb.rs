use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::TmdbConfig;
use crate::error::ApiError;

/// Single entry point for outbound calls to the movie API.
#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn request(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self> {
        let user_agent = format!("cinestore/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(TmdbConfig::from_env()?)
    }

    pub fn config(&self) -> &TmdbConfig {
        &self.config
    }

    /// Caller parameters first, then the credential and locale. The injected pair always wins.
    pub fn build_url(&self, path: &str, query: &[(&str, String)]) -> String {
        let injected = [
            ("api_key", self.config.api_key.as_str()),
            ("language", self.config.language.as_str()),
        ];
        let params = query
            .iter()
            .filter(|(k, _)| !injected.iter().any(|(name, _)| name == k))
            .map(|(k, v)| (*k, v.as_str()))
            .chain(injected.iter().copied());

        let mut url = format!("{}{}", self.config.base_url, path);
        for (i, (key, value)) in params.enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn request(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = self.build_url(path, query);
        debug!(path = %path, params = query.len(), "TMDB request");

        let res = self.client.get(&url).send().await.map_err(|e| {
            // The URL carries the credential.
            let e = e.without_url();
            warn!("TMDB request to {} failed: {}", path, e);
            if e.is_builder() {
                ApiError::Unexpected
            } else {
                ApiError::Network
            }
        })?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            let e = e.without_url();
            warn!("Reading TMDB body for {} failed: {}", path, e);
            if e.is_timeout() {
                ApiError::Network
            } else {
                ApiError::Unexpected
            }
        })?;

        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16(), &text);
            warn!("TMDB {} -> {}: {}", path, status, err);
            return Err(err);
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!("TMDB {} returned invalid JSON: {}", path, e);
            ApiError::Unexpected
        })
    }
}
