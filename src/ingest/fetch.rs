use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use super::config::IngestConfig;

/// Anything that can turn a URL into a page body.
pub trait PageSource {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

/// Get the platform-appropriate cache directory for fetched pages
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("autofinder/page-cache"))
        .unwrap_or_else(|| crate::config::get_config_dir().join("page-cache"))
}

/// On-disk page cache keyed by URL.
///
/// Entries older than the ttl are ignored. Write failures are logged and
/// otherwise ignored; a cache miss is never an error.
#[derive(Debug, Clone)]
pub struct PageCache {
    path: PathBuf,
    ttl: Duration,
}

#[derive(Serialize, Deserialize)]
struct CachedPage {
    fetched_at: DateTime<Utc>,
    body: String,
}

impl PageCache {
    pub fn new(path: PathBuf, ttl: Duration) -> Self {
        Self { path, ttl }
    }

    pub fn get(&self, url: &str) -> Option<String> {
        let bytes = cacache::read_sync(&self.path, url).ok()?;
        let entry: CachedPage = serde_json::from_slice(&bytes).ok()?;

        let age = Utc::now().signed_duration_since(entry.fetched_at).to_std().ok()?;
        if age > self.ttl {
            tracing::debug!(url, "cached page expired");
            return None;
        }
        Some(entry.body)
    }

    pub fn put(&self, url: &str, body: &str) {
        let entry = CachedPage {
            fetched_at: Utc::now(),
            body: body.to_string(),
        };
        let result = serde_json::to_vec(&entry)
            .context("Failed to serialize cached page")
            .and_then(|bytes| {
                cacache::write_sync(&self.path, url, bytes).context("Failed to write page cache")
            });
        if let Err(e) = result {
            tracing::debug!(url, error = %e, "page not cached");
        }
    }
}

/// HTTP page fetcher with retry and an optional page cache.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    attempts: usize,
    cache: Option<PageCache>,
}

impl PageFetcher {
    pub fn new(config: &IngestConfig, use_cache: bool) -> Result<Self> {
        let timeout = config
            .timeout_duration()
            .with_context(|| format!("Invalid ingest timeout '{}'", config.timeout))?;

        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let cache = if use_cache && config.cache {
            let ttl = config
                .cache_ttl_duration()
                .with_context(|| format!("Invalid cache ttl '{}'", config.cache_ttl))?;
            Some(PageCache::new(get_cache_path(), ttl))
        } else {
            None
        };

        Ok(Self {
            client,
            attempts: config.retries.max(1),
            cache,
        })
    }

    async fn fetch_remote(&self, url: &Url) -> Result<String> {
        // Retry strategy: exponential backoff, transient failures only
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(self.attempts.saturating_sub(1));

        let body = RetryIf::start(
            retry_strategy,
            || async {
                self.client
                    .get(url.clone())
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await
            },
            is_transient,
        )
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

        Ok(body)
    }
}

impl PageSource for PageFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        if let Some(cache) = &self.cache {
            if let Some(body) = cache.get(url.as_str()) {
                tracing::debug!(%url, "served from page cache");
                return Ok(body);
            }
        }

        let body = self.fetch_remote(url).await?;

        if let Some(cache) = &self.cache {
            cache.put(url.as_str(), &body);
        }
        Ok(body)
    }
}

/// Timeouts, connection failures, 429 and 5xx are worth another try.
fn is_transient(error: &reqwest::Error) -> bool {
    if error.is_timeout() || error.is_connect() {
        return true;
    }
    error
        .status()
        .map(|s| s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error())
        .unwrap_or(false)
}
